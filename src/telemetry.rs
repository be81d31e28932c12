//! Logging setup
//!
//! `RUST_LOG` wins; otherwise the configured log level applies. Log output
//! goes to stderr so command output on stdout stays clean.

use tracing_subscriber::EnvFilter;

use crate::error::{LedgerError, LedgerResult};

/// Build the filter for a configured level
pub fn env_filter(log_level: &str) -> LedgerResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(log_level).map_err(|e| {
            LedgerError::Config(format!("Invalid log level '{}': {}", log_level, e))
        }),
    }
}

/// Install the global subscriber
pub fn init(log_level: &str) -> LedgerResult<()> {
    let filter = env_filter(log_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| LedgerError::Config(format!("Failed to initialize logging: {}", e)))
}
