//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so a missing file still
//! yields a working configuration.

pub mod analytics;
pub mod auth;
pub mod logging;
pub mod policy;
pub mod session;
pub mod storage;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::analytics::AnalyticsConfig;
use self::auth::AuthConfig;
use self::logging::LoggingConfig;
use self::policy::PolicyConfig;
use self::session::SessionConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential, lockout and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Persisted-state settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Access levels, hubs, permission matrix and page requirements.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Analytics event log settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the `config/` directory of the working directory.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SESMINE`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env)
    }

    /// Load configuration from `default.toml` and `{env}.toml` inside `dir`.
    pub fn load_from(dir: &Path, env: &str) -> Result<Self, AppError> {
        let default_file = dir.join("default");
        let env_file = dir.join(env);

        let config = config::Config::builder()
            .add_source(config::File::from(default_file).required(false))
            .add_source(config::File::from(env_file).required(false))
            .add_source(
                config::Environment::with_prefix("SESMINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
