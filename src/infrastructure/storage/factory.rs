//! Storage factory for runtime storage selection

use std::sync::Arc;

use tracing::info;

use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

use super::in_memory::InMemoryStorage;
use super::postgres::{PostgresConfig, PostgresStorage};

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// PostgreSQL storage configuration
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a PostgreSQL storage configuration
    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    /// Creates a PostgreSQL configuration from a URL
    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    /// Resolves a backend name from configuration. Postgres requires a URL.
    pub fn from_backend(
        backend: &str,
        database_url: Option<&str>,
        max_connections: u32,
    ) -> Result<Self, DomainError> {
        match StorageType::from_str(backend) {
            Some(StorageType::InMemory) => Ok(Self::InMemory),
            Some(StorageType::Postgres) => {
                let url = database_url.filter(|u| !u.is_empty()).ok_or_else(|| {
                    DomainError::configuration("storage.database_url is required for postgres")
                })?;

                Ok(Self::Postgres(
                    PostgresConfig::new(url).with_max_connections(max_connections),
                ))
            }
            None => Err(DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                backend
            ))),
        }
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a storage instance based on the configuration
    pub async fn create<E>(
        config: &StorageConfig,
        table_name: &str,
    ) -> Result<Arc<dyn Storage<E>>, DomainError>
    where
        E: StorageEntity + 'static,
    {
        match config {
            StorageConfig::InMemory => {
                info!(table = %table_name, "Using in-memory storage");
                Ok(Arc::new(InMemoryStorage::<E>::new()))
            }
            StorageConfig::Postgres(pg_config) => {
                info!(table = %table_name, "Using PostgreSQL storage");
                let storage = PostgresStorage::<E>::connect(pg_config, table_name).await?;
                storage.ensure_table().await?;
                Ok(Arc::new(storage))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!(
            StorageType::from_str("memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("in-memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("postgres"),
            Some(StorageType::Postgres)
        );
        assert_eq!(StorageType::from_str("pg"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("unknown"), None);
    }

    #[test]
    fn test_from_backend() {
        let config = StorageConfig::from_backend("memory", None, 5).unwrap();
        assert_eq!(config.storage_type(), StorageType::InMemory);

        let config =
            StorageConfig::from_backend("postgres", Some("postgres://localhost/test"), 20)
                .unwrap();
        match config {
            StorageConfig::Postgres(pg) => {
                assert_eq!(pg.url, "postgres://localhost/test");
                assert_eq!(pg.max_connections, 20);
            }
            other => panic!("Expected Postgres config, got {:?}", other),
        }
    }

    #[test]
    fn test_from_backend_errors() {
        assert!(matches!(
            StorageConfig::from_backend("postgres", None, 5),
            Err(DomainError::Configuration { .. })
        ));
        assert!(matches!(
            StorageConfig::from_backend("cassandra", None, 5),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        use crate::domain::incident::{Alert, CaseRecord};

        let storage = StorageFactory::create::<CaseRecord>(&StorageConfig::in_memory(), "cases")
            .await
            .unwrap();
        let record = CaseRecord::open(&Alert::new("inc-1", "High CPU Usage")).unwrap();

        storage.create(record).await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 1);
    }
}
