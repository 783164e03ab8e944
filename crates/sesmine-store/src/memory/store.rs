//! In-memory state store using the dashmap crate.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use sesmine_core::error::AppError;
use sesmine_core::result::AppResult;
use sesmine_core::traits::store::StateStore;

/// In-memory state store.
///
/// Clones share the same map, so handing one clone to each session manager
/// gives them the same view that tabs of one browser have of local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Key -> JSON document.
    entries: Arc<DashMap<String, String>>,
    /// Optional quota on the total size of keys plus values, in bytes.
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key() != key)
            .map(|entry| entry.key().len() + entry.value().len())
            .sum()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key) + key.len() + value.len();
            if needed > quota {
                warn!(key, needed, quota, "State store quota exceeded");
                return Err(AppError::storage(format!(
                    "Quota exceeded writing '{key}' ({needed} of {quota} bytes)"
                )));
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        if self.entries.remove(key).is_some() {
            debug!(key, "Removed state entry");
        }
        Ok(())
    }

    fn keys(&self, prefix: &str) -> AppResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
