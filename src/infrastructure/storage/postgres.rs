//! PostgreSQL storage implementation with connection pooling

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::domain::storage::{delete_conflict, state_conflict, Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/chatops_console".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

/// PostgreSQL storage implementation with connection pooling
///
/// Stores entities as JSONB in a table with (key, state, data) columns. The
/// `state` column mirrors the entity's state tag so guarded updates and state
/// listings are single statements.
pub struct PostgresStorage<E>
where
    E: StorageEntity,
{
    pool: PgPool,
    table_name: String,
    _phantom: PhantomData<E>,
}

impl<E> Debug for PostgresStorage<E>
where
    E: StorageEntity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStorage")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl<E> PostgresStorage<E>
where
    E: StorageEntity,
{
    /// Creates a new PostgreSQL storage with the given pool and table name
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
            _phantom: PhantomData,
        }
    }

    /// Creates a new PostgreSQL storage with connection pooling
    pub async fn connect(
        config: &PostgresConfig,
        table_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool, table_name))
    }

    /// Ensures the storage table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key VARCHAR(255) PRIMARY KEY,
                state VARCHAR(64),
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS {0}_state_idx ON {0} (state)",
            self.table_name
        );

        sqlx::query(&index)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create index: {}", e)))?;

        Ok(())
    }
}

fn encode<E: StorageEntity>(entity: &E) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(entity)
        .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))
}

fn decode<E: StorageEntity>(row: &sqlx::postgres::PgRow) -> Result<E, DomainError> {
    let data: serde_json::Value = row.get("data");
    serde_json::from_value(data)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize entity: {}", e)))
}

#[async_trait]
impl<E> Storage<E> for PostgresStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let query = format!(
            "SELECT data FROM {} WHERE key = $1",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get entity: {}", e)))?;

        result.as_ref().map(decode::<E>).transpose()
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let query = format!(
            "SELECT data FROM {} ORDER BY created_at",
            self.table_name
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list entities: {}", e)))?;

        rows.iter().map(decode::<E>).collect()
    }

    async fn list_by_state(&self, state: &str) -> Result<Vec<E>, DomainError> {
        let query = format!(
            "SELECT data FROM {} WHERE state = $1 ORDER BY created_at",
            self.table_name
        );

        let rows = sqlx::query(&query)
            .bind(state)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list entities: {}", e)))?;

        rows.iter().map(decode::<E>).collect()
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let data = encode(&entity)?;

        let query = format!(
            r#"
            INSERT INTO {} (key, state, data)
            VALUES ($1, $2, $3)
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(&key)
            .bind(entity.state_tag())
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("duplicate key") {
                    DomainError::conflict(format!("Entity with key '{}' already exists", key))
                } else {
                    DomainError::storage(format!("Failed to create entity: {}", e))
                }
            })?;

        Ok(entity)
    }

    async fn update_if_state(&self, entity: E, expected_state: &str) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let data = encode(&entity)?;

        let query = format!(
            r#"
            UPDATE {}
            SET state = $2, data = $3, updated_at = NOW()
            WHERE key = $1 AND state = $4
            "#,
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(&key)
            .bind(entity.state_tag())
            .bind(&data)
            .bind(expected_state)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update entity: {}", e)))?;

        if result.rows_affected() == 0 {
            if self.exists(entity.key()).await? {
                return Err(state_conflict(entity.key(), expected_state));
            }

            return Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            )));
        }

        Ok(entity)
    }

    async fn delete_if_state(
        &self,
        key: &E::Key,
        allowed_states: &[&str],
    ) -> Result<bool, DomainError> {
        let query = format!(
            "DELETE FROM {} WHERE key = $1 AND state = ANY($2)",
            self.table_name
        );
        let states: Vec<String> = allowed_states.iter().map(|s| s.to_string()).collect();

        let result = sqlx::query(&query)
            .bind(key.as_str())
            .bind(&states)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete entity: {}", e)))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        if self.exists(key).await? {
            return Err(delete_conflict(key, allowed_states));
        }

        Ok(false)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) as count FROM {}", self.table_name);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count entities: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;

        Ok(())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE key = $1) as exists",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check existence: {}", e)))?;

        let exists: bool = row.get("exists");
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_default() {
        let config = PostgresConfig::default();

        assert_eq!(config.url, "postgres://localhost/chatops_console");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.idle_timeout_secs, 600);
    }

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/test")
            .with_max_connections(20)
            .with_min_connections(5)
            .with_connect_timeout(60)
            .with_idle_timeout(300);

        assert_eq!(config.url, "postgres://localhost/test");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.connect_timeout_secs, 60);
        assert_eq!(config.idle_timeout_secs, 300);
    }
}
