//! Logging setup.
//!
//! Maestro emits structured `tracing` events and one span per executed
//! command. Install a subscriber once per process (typically at the top of a
//! test) to see them.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the log filter
pub const LOG_ENV_VAR: &str = "MAESTRO_LOG";

/// Install a fmt subscriber filtered by `MAESTRO_LOG`, falling back to
/// `default_filter`.
///
/// Returns `false` when a global subscriber is already installed, so calling
/// this from several tests is harmless.
pub fn init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init()
        .is_ok()
}
