//! Analytics event log configuration.

use serde::{Deserialize, Serialize};

/// Analytics event log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Whether lifecycle events are recorded.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum number of retained records; the oldest are dropped first.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_events: default_max_events(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_events() -> usize {
    500
}
