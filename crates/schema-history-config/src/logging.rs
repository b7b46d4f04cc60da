// crates/schema-history-config/src/logging.rs
// ============================================================================
// Module: Logging Setup
// Description: Installs the global tracing subscriber.
// Purpose: Route store events to stderr as text or JSON.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Builds an [`EnvFilter`] from `RUST_LOG`, falling back to the configured
//! filter, and installs a `fmt` subscriber in the configured [`LogFormat`].
//! Installation happens at most once per process.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::config::LoggingConfig;

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Filter directives failed to parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// A global subscriber is already installed.
    #[error("tracing subscriber install failed: {0}")]
    Install(String),
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when the filter is invalid and
/// [`LoggingError::Install`] when a subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|err| LoggingError::Filter(err.to_string()))?,
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = match config.format {
        LogFormat::Text => builder.with_writer(std::io::stderr).try_init(),
        LogFormat::Json => builder.json().with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| LoggingError::Install(err.to_string()))
}
