//! Session lifetime configuration.

use serde::{Deserialize, Serialize};

/// Session lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sliding inactivity timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Interval of the background validity re-check in seconds.
    #[serde(default = "default_check_interval")]
    pub validity_check_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            validity_check_interval_seconds: default_check_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    24 * 60 * 60
}

fn default_check_interval() -> u64 {
    60
}
