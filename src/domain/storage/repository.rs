//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::{StorageEntity, StorageKey};

/// Generic storage trait for CRUD operations on any entity type
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    /// Retrieves an entity by its key
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Retrieves all entities whose state tag equals `state`
    async fn list_by_state(&self, state: &str) -> Result<Vec<E>, DomainError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|e| e.state_tag() == Some(state))
            .collect())
    }

    /// Creates a new entity, returns error if already exists
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Updates an existing entity only while its stored state tag equals
    /// `expected_state`.
    ///
    /// Returns `DomainError::NotFound` if the key is missing and
    /// `DomainError::Conflict` if another writer moved the entity out of
    /// `expected_state` first. The check and the write are atomic.
    async fn update_if_state(&self, entity: E, expected_state: &str) -> Result<E, DomainError>;

    /// Deletes an entity only while its stored state tag is one of
    /// `allowed_states`.
    ///
    /// Returns `Ok(false)` if the key is missing and `DomainError::Conflict`
    /// if the entity is in any other state. The check and the delete are
    /// atomic.
    async fn delete_if_state(
        &self,
        key: &E::Key,
        allowed_states: &[&str],
    ) -> Result<bool, DomainError>;

    /// Checks if an entity exists by its key
    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Returns the count of entities
    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Formats the conflict raised by a failed guarded update
pub(crate) fn state_conflict<K: StorageKey>(key: &K, expected_state: &str) -> DomainError {
    DomainError::conflict(format!(
        "Entity with key '{}' is no longer in state '{}'",
        key.as_str(),
        expected_state
    ))
}

/// Formats the conflict raised by a refused guarded delete
pub(crate) fn delete_conflict<K: StorageKey>(key: &K, allowed_states: &[&str]) -> DomainError {
    DomainError::conflict(format!(
        "Entity with key '{}' can only be deleted while in state {}",
        key.as_str(),
        allowed_states.join(", ")
    ))
}
