//! Logging setup.
//!
//! The engine and runtime emit `tracing` events; this installs a fmt
//! subscriber for them. `RUST_LOG` overrides the configured level.

use prism_foundation::{Error, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogConfig;

/// Builds the filter: `RUST_LOG` if set, otherwise the configured level.
///
/// # Errors
/// Returns a configuration error if the configured directive does not parse.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| Error::configuration(format!("invalid log filter '{}': {e}", config.level)))
}

/// Installs the global subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one is left in place.
///
/// # Errors
/// Returns a configuration error if the filter directive does not parse.
pub fn init_logging(config: &LogConfig) -> Result<bool> {
    let filter = env_filter(config)?;
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(config.show_target)
                .with_ansi(config.ansi),
        )
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(level = %config.level, "logging initialised");
    }
    Ok(installed)
}
