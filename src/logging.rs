//! Tracing subscriber installation.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use sesmine_core::config::logging::LoggingConfig;
use sesmine_core::error::AppError;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the configured level. `format = "json"` emits one
/// JSON object per line; anything else uses the pretty formatter. Fails if
/// a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    result.map_err(|e| AppError::configuration(format!("Failed to install log subscriber: {e}")))
}
