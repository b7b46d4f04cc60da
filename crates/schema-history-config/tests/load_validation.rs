//! Config loading tests for schema-history-config.
// crates/schema-history-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Tests
// Description: Validate TOML loading, defaults, and file limits.
// Purpose: Ensure config files parse strictly and fail closed.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::path::PathBuf;

use schema_history_config::ConfigError;
use schema_history_config::LogFormat;
use schema_history_config::MAX_CONFIG_FILE_SIZE;
use schema_history_config::SchemaHistoryConfig;
use schema_history_config::StoreType;
use schema_history_core::OrderingCheck;
use schema_history_store_sqlite::DEFAULT_BUSY_TIMEOUT_MS;
use schema_history_store_sqlite::DEFAULT_MAX_SNAPSHOT_BYTES;
use schema_history_store_sqlite::SqliteStoreConfig;
use schema_history_store_sqlite::SqliteStoreMode;
use schema_history_store_sqlite::SqliteSyncMode;
use tempfile::TempDir;

fn write_config(temp: &TempDir, content: &[u8]) -> PathBuf {
    let path = temp.path().join("schema-history.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn empty_config_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, b"");
    let config = SchemaHistoryConfig::load(Some(&path)).unwrap();
    assert_eq!(config.store.store_type, StoreType::Memory);
    assert_eq!(config.store.retention_days, 7);
    assert_eq!(config.store.max_snapshot_bytes, DEFAULT_MAX_SNAPSHOT_BYTES);
    assert_eq!(config.store.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    assert_eq!(config.store.ordering, OrderingCheck::Relaxed);
    assert_eq!(config.logging.filter, "info");
    assert_eq!(config.logging.format, LogFormat::Text);
}

#[test]
fn store_defaults_match_sqlite_backend() {
    let config: SchemaHistoryConfig = toml::from_str("[store]\npath = \"schema.db\"\n").unwrap();
    let backend = SqliteStoreConfig::new("schema.db");
    assert_eq!(config.store.busy_timeout_ms, backend.busy_timeout_ms);
    assert_eq!(config.store.max_snapshot_bytes, backend.max_snapshot_bytes);
    assert_eq!(config.store.retention_days, backend.retention_days);
    assert_eq!(config.store.journal_mode, backend.journal_mode);
    assert_eq!(config.store.sync_mode, backend.sync_mode);
}

#[test]
fn full_config_parses() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        br#"
[store]
type = "sqlite"
path = "data/schema.db"
busy_timeout_ms = 2500
journal_mode = "delete"
sync_mode = "normal"
retention_days = 14
max_snapshot_bytes = 1048576
ordering = "strict"

[logging]
filter = "schema_history_store_sqlite=debug,info"
format = "json"
"#,
    );
    let config = SchemaHistoryConfig::load(Some(&path)).unwrap();
    assert_eq!(config.store.store_type, StoreType::Sqlite);
    assert_eq!(config.store.path, Some(PathBuf::from("data/schema.db")));
    assert_eq!(config.store.busy_timeout_ms, 2_500);
    assert_eq!(config.store.journal_mode, SqliteStoreMode::Delete);
    assert_eq!(config.store.sync_mode, SqliteSyncMode::Normal);
    assert_eq!(config.store.retention_days, 14);
    assert_eq!(config.store.ordering, OrderingCheck::Strict);
    assert_eq!(config.logging.format, LogFormat::Json);

    let sqlite = config.store.sqlite_config().unwrap();
    assert_eq!(sqlite.max_snapshot_bytes, 1_048_576);
    assert_eq!(sqlite.ordering, OrderingCheck::Strict);
}

#[test]
fn missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");
    assert!(matches!(SchemaHistoryConfig::load(Some(&path)), Err(ConfigError::Io(_))));
}

#[test]
fn malformed_toml_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, b"[store\ntype = ");
    assert!(matches!(SchemaHistoryConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
}

#[test]
fn unknown_store_type_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, b"[store]\ntype = \"mysql\"\n");
    assert!(matches!(SchemaHistoryConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
}

#[test]
fn oversized_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut content = b"# ".to_vec();
    content.extend(std::iter::repeat_n(b'x', MAX_CONFIG_FILE_SIZE));
    let path = write_config(&temp, &content);
    let result = SchemaHistoryConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(message)) if message.contains("size limit")));
}

#[test]
fn non_utf8_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, &[0xff, 0xfe, 0x00]);
    let result = SchemaHistoryConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(message)) if message.contains("utf-8")));
}

#[test]
fn invalid_values_fail_validation_on_load() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, b"[store]\ntype = \"memory\"\npath = \"schema.db\"\n");
    assert!(matches!(SchemaHistoryConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));

    let path = write_config(&temp, b"[logging]\nfilter = \"info,store=loudest\"\n");
    assert!(matches!(SchemaHistoryConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}
