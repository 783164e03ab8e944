//! State store manager that dispatches to the configured backend.

use std::sync::Arc;

use tracing::info;

use sesmine_core::config::storage::{StorageBackend, StorageConfig};
use sesmine_core::error::AppError;
use sesmine_core::result::AppResult;
use sesmine_core::traits::store::StateStore;

/// State store manager that wraps the configured backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner backend.
    inner: Arc<dyn StateStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn StateStore> = match config.backend {
            #[cfg(feature = "memory")]
            StorageBackend::Memory => {
                info!("Initializing in-memory state store");
                Arc::new(crate::memory::MemoryStore::new())
            }
            #[cfg(feature = "file")]
            StorageBackend::File => {
                info!(directory = %config.directory, "Initializing file state store");
                Arc::new(crate::file::FileStore::new(&config.directory)?)
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(AppError::configuration(format!(
                    "State backend '{other:?}' is not compiled in"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing backend (for testing).
    pub fn from_store(store: Arc<dyn StateStore>) -> Self {
        Self { inner: store }
    }

    /// Shared handle to the inner backend.
    pub fn store(&self) -> Arc<dyn StateStore> {
        Arc::clone(&self.inner)
    }
}

impl StateStore for StoreManager {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key)
    }

    fn keys(&self, prefix: &str) -> AppResult<Vec<String>> {
        self.inner.keys(prefix)
    }
}
