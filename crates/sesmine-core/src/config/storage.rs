//! Persisted-state configuration.

use serde::{Deserialize, Serialize};

/// Persisted-state configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Namespace prepended to every logical key.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Which backend holds the state.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory used by the file backend.
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            backend: StorageBackend::default(),
            directory: default_directory(),
        }
    }
}

/// Available state backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local map; lost on restart.
    #[default]
    Memory,
    /// One JSON document per key in a directory.
    File,
}

fn default_prefix() -> String {
    "sesmine_".to_string()
}

fn default_directory() -> String {
    "data/state".to_string()
}
