//! Logging setup
//!
//! Library code emits `tracing` events; the binary installs a plain fmt
//! subscriber on stderr so stdout carries only command output.

use crate::config::LOG_ENV_VAR;
use tracing_subscriber::EnvFilter;

/// Filter applied when `CLASSIFICATION_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Build the env filter from `CLASSIFICATION_LOG`
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
