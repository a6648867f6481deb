//! Prompt store backends.
//!
//! Every backend implements [`PromptStore`] and reports its capabilities:
//!
//! | Backend | Mode | Atomicity | Location |
//! |---------|------|-----------|----------|
//! | Memory | `local-fallback` | Transactional | Process memory |
//! | `SQLite` | `external-store` | Configurable | `<data dir>/promptops/prompts.db` |
//! | PostgreSQL | `external-store` | Configurable | Configured connection |
//!
//! PostgreSQL requires the `postgres` feature.

mod memory;
#[cfg(feature = "postgres")]
mod postgresql;
mod sqlite;
mod traits;

pub use memory::MemoryPromptStore;
#[cfg(feature = "postgres")]
pub use postgresql::PostgresPromptStore;
pub use sqlite::SqlitePromptStore;
pub use traits::{Atomicity, PromptStore, StoreMode};

use crate::config::{StoreBackendType, StoreSettings};
use crate::{Error, Result};
use std::sync::Arc;

/// Factory for creating the configured prompt store.
pub struct PromptStoreFactory;

impl PromptStoreFactory {
    /// Creates a store from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - PostgreSQL is selected without a connection string
    /// - PostgreSQL is selected but the `postgres` feature is not compiled in
    /// - No `SQLite` path is configured and no data directory can be determined
    /// - The backend cannot be initialized
    pub fn create(settings: &StoreSettings) -> Result<Arc<dyn PromptStore>> {
        let store: Arc<dyn PromptStore> = match settings.backend {
            StoreBackendType::Memory => Arc::new(MemoryPromptStore::new()),
            StoreBackendType::Sqlite => {
                let db_path = settings
                    .path
                    .clone()
                    .or_else(SqlitePromptStore::default_path)
                    .ok_or_else(|| {
                        Error::InvalidInput("Database path required for SQLite backend".to_string())
                    })?;
                Arc::new(SqlitePromptStore::new(db_path, settings.atomic_writes)?)
            },
            StoreBackendType::PostgreSQL => {
                let url = settings.connection_string.as_deref().ok_or_else(|| {
                    Error::InvalidInput(
                        "Connection URL required for PostgreSQL backend".to_string(),
                    )
                })?;
                Self::create_postgres(url, settings.atomic_writes)?
            },
        };

        tracing::info!(
            backend = store.backend_name(),
            mode = %store.mode(),
            atomicity = ?store.atomicity(),
            "Prompt store ready"
        );

        Ok(store)
    }

    #[cfg(feature = "postgres")]
    fn create_postgres(url: &str, atomic_writes: bool) -> Result<Arc<dyn PromptStore>> {
        Ok(Arc::new(PostgresPromptStore::new(url, atomic_writes)?))
    }

    #[cfg(not(feature = "postgres"))]
    fn create_postgres(_url: &str, _atomic_writes: bool) -> Result<Arc<dyn PromptStore>> {
        Err(Error::FeatureNotEnabled("postgres".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings_create_memory_store() {
        let store = PromptStoreFactory::create(&StoreSettings::default()).unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert_eq!(store.mode(), StoreMode::LocalFallback);
    }

    #[test]
    fn test_create_sqlite_store() {
        let dir = TempDir::new().unwrap();
        let settings = StoreSettings {
            backend: StoreBackendType::Sqlite,
            path: Some(dir.path().join("nested").join("prompts.db")),
            atomic_writes: false,
            ..StoreSettings::default()
        };

        let store = PromptStoreFactory::create(&settings).unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        assert_eq!(store.mode(), StoreMode::ExternalStore);
        assert_eq!(store.atomicity(), Atomicity::BestEffort);
    }

    #[test]
    fn test_postgres_requires_connection_string() {
        let settings = StoreSettings {
            backend: StoreBackendType::PostgreSQL,
            ..StoreSettings::default()
        };

        let result = PromptStoreFactory::create(&settings);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[cfg(not(feature = "postgres"))]
    #[test]
    fn test_postgres_without_feature() {
        let settings = StoreSettings {
            backend: StoreBackendType::PostgreSQL,
            connection_string: Some("postgresql://localhost/promptops".to_string()),
            ..StoreSettings::default()
        };

        let result = PromptStoreFactory::create(&settings);
        assert!(matches!(result, Err(Error::FeatureNotEnabled(ref f)) if f == "postgres"));
    }
}
