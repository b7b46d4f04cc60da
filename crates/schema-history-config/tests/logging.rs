//! Tracing subscriber installation tests.
// crates/schema-history-config/tests/logging.rs
// =============================================================================
// Module: Logging Setup Tests
// Description: Validate global subscriber installation.
// Purpose: Ensure the subscriber installs once and rejects reinstallation.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use schema_history_config::LogFormat;
use schema_history_config::LoggingConfig;
use schema_history_config::LoggingError;
use schema_history_config::init_tracing;

#[test]
fn subscriber_installs_once() {
    let config = LoggingConfig {
        filter: "debug".to_string(),
        format: LogFormat::Json,
    };
    init_tracing(&config).unwrap();
    tracing::info!(insertion_id = 1_i64, "subscriber installed");
    assert!(matches!(init_tracing(&LoggingConfig::default()), Err(LoggingError::Install(_))));
}
