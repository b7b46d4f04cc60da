//! Store config validation tests for schema-history-config.
// crates/schema-history-config/tests/storage_validation.rs
// =============================================================================
// Module: Store Config Validation Tests
// Description: Validate store backend constraints and store construction.
// Purpose: Ensure store configuration fails closed and builds working backends.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::PathBuf;

use schema_history_config::ConfigError;
use schema_history_config::SchemaHistoryConfig;
use schema_history_config::StoreType;
use schema_history_core::Position;
use schema_history_core::StoreError;
use tempfile::TempDir;

type TestResult = Result<(), String>;

fn minimal_config() -> SchemaHistoryConfig {
    toml::from_str("").unwrap()
}

fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn memory_store_rejects_path() -> TestResult {
    let mut config = minimal_config();
    config.store.store_type = StoreType::Memory;
    config.store.path = Some(PathBuf::from("schema.db"));
    assert_invalid(config.validate(), "memory store must not set path")
}

#[test]
fn sqlite_store_requires_path() -> TestResult {
    let mut config = minimal_config();
    config.store.store_type = StoreType::Sqlite;
    assert_invalid(config.validate(), "sqlite store requires path")
}

#[test]
fn store_rejects_zero_retention_days() -> TestResult {
    let mut config = minimal_config();
    config.store.retention_days = 0;
    assert_invalid(config.validate(), "retention_days must be greater than zero")
}

#[test]
fn store_rejects_out_of_range_snapshot_limit() -> TestResult {
    let mut config = minimal_config();
    config.store.max_snapshot_bytes = 0;
    assert_invalid(config.validate(), "max_snapshot_bytes")
}

#[test]
fn sqlite_store_rejects_long_busy_timeout() -> TestResult {
    let mut config = minimal_config();
    config.store.store_type = StoreType::Sqlite;
    config.store.path = Some(PathBuf::from("schema.db"));
    config.store.busy_timeout_ms = u64::MAX;
    assert_invalid(config.validate(), "busy_timeout_ms")
}

#[test]
fn open_store_rejects_invalid_config() {
    let mut config = minimal_config();
    config.store.store_type = StoreType::Sqlite;
    assert!(matches!(config.open_store(), Err(StoreError::Invalid(_))));
}

#[test]
fn open_store_builds_memory_backend() {
    let store = minimal_config().open_store().unwrap();
    store.save_snapshot(b"S1", &Position::new(1, "bin.000001", 4)).unwrap();
    assert_eq!(store.load_last_snapshot().unwrap().unwrap().payload, b"S1");
}

#[test]
fn open_store_builds_sqlite_backend() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("schema.db");
    let mut config = minimal_config();
    config.store.store_type = StoreType::Sqlite;
    config.store.path = Some(path.clone());
    {
        let store = config.open_store().unwrap();
        store.save_snapshot(b"S1", &Position::new(1, "bin.000001", 4)).unwrap();
        store.readiness().unwrap();
    }
    assert!(path.exists());
    let store = config.open_store().unwrap();
    assert_eq!(store.load_last_snapshot().unwrap().unwrap().payload, b"S1");
}

#[test]
fn sqlite_store_rejects_blank_path() -> TestResult {
    let mut config = minimal_config();
    config.store.store_type = StoreType::Sqlite;
    config.store.path = Some(PathBuf::from("   "));
    assert_invalid(config.validate(), "store path must be non-empty")
}

#[test]
fn sqlite_store_rejects_directory_path() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let mut config = minimal_config();
    config.store.store_type = StoreType::Sqlite;
    config.store.path = Some(temp.path().to_path_buf());
    assert_invalid(config.validate(), "store path must be a file")
}

#[test]
fn sqlite_store_rejects_overlong_path_component() -> TestResult {
    let mut config = minimal_config();
    config.store.store_type = StoreType::Sqlite;
    config.store.path = Some(PathBuf::from("data").join("x".repeat(300)));
    assert_invalid(config.validate(), "overlong component")
}
