// crates/schema-history-config/src/config.rs
// ============================================================================
// Module: Schema History Configuration
// Description: Configuration loading and validation for the schema store.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: schema-history-core, schema-history-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. A validated configuration
//! builds the store backend it describes through [`StoreConfig::open_store`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use schema_history_core::DEFAULT_RETENTION_DAYS;
use schema_history_core::InMemorySchemaStore;
use schema_history_core::OrderingCheck;
use schema_history_core::RetentionPolicy;
use schema_history_core::SchemaStore;
use schema_history_core::StoreError;
use schema_history_store_sqlite::DEFAULT_BUSY_TIMEOUT_MS;
use schema_history_store_sqlite::DEFAULT_MAX_SNAPSHOT_BYTES;
use schema_history_store_sqlite::MAX_SNAPSHOT_BYTES;
use schema_history_store_sqlite::SqliteSchemaStore;
use schema_history_store_sqlite::SqliteStoreConfig;
use schema_history_store_sqlite::SqliteStoreMode;
use schema_history_store_sqlite::SqliteSyncMode;
use schema_history_store_sqlite::validate_store_path;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "schema-history.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SCHEMA_HISTORY_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum busy timeout accepted for `SQLite` connections.
const MAX_BUSY_TIMEOUT_MS: u64 = 10 * 60 * 1_000;

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Schema history configuration loaded from `schema-history.toml`.
///
/// # Invariants
/// - A value returned by [`SchemaHistoryConfig::load`] has passed validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaHistoryConfig {
    /// Store backend configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SchemaHistoryConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from `path`, then [`CONFIG_ENV_VAR`], then
    /// `schema-history.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Builds the configured store backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the configuration is invalid or the
    /// backend cannot be opened.
    pub fn open_store(&self) -> Result<Box<dyn SchemaStore + Send + Sync>, StoreError> {
        self.store.open_store()
    }
}

// ============================================================================
// SECTION: Store Config
// ============================================================================

/// Schema store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Retention window in days for history older than the previous snapshot.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Maximum snapshot payload size in bytes.
    #[serde(default = "default_max_snapshot_bytes")]
    pub max_snapshot_bytes: usize,
    /// Ordering validation applied on saves.
    #[serde(default)]
    pub ordering: OrderingCheck,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            retention_days: default_retention_days(),
            max_snapshot_bytes: default_max_snapshot_bytes(),
            ordering: OrderingCheck::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a field is inconsistent with the
    /// backend type or out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention_days == 0 {
            return Err(ConfigError::Invalid(
                "store retention_days must be greater than zero".to_string(),
            ));
        }
        if self.max_snapshot_bytes == 0 || self.max_snapshot_bytes > MAX_SNAPSHOT_BYTES {
            return Err(ConfigError::Invalid(format!(
                "store max_snapshot_bytes must be between 1 and {MAX_SNAPSHOT_BYTES}"
            )));
        }
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory store must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self
                    .path
                    .as_ref()
                    .ok_or_else(|| ConfigError::Invalid("sqlite store requires path".to_string()))?;
                validate_store_path(path)
                    .map_err(|err| ConfigError::Invalid(err.to_string()))?;
                if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
                    return Err(ConfigError::Invalid(format!(
                        "store busy_timeout_ms exceeds {MAX_BUSY_TIMEOUT_MS}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Returns the `SQLite` backend configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when no path is configured.
    pub fn sqlite_config(&self) -> Result<SqliteStoreConfig, ConfigError> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| ConfigError::Invalid("sqlite store requires path".to_string()))?;
        Ok(SqliteStoreConfig {
            path,
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            retention_days: self.retention_days,
            max_snapshot_bytes: self.max_snapshot_bytes,
            ordering: self.ordering,
        })
    }

    /// Validates the configuration and builds the store backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for invalid configuration and the
    /// backend's error when it cannot be opened.
    pub fn open_store(&self) -> Result<Box<dyn SchemaStore + Send + Sync>, StoreError> {
        self.validate().map_err(|err| StoreError::Invalid(err.to_string()))?;
        match self.store_type {
            StoreType::Memory => {
                let retention = RetentionPolicy::from_days(self.retention_days)?;
                info!(retention_days = self.retention_days, "opening in-memory schema store");
                Ok(Box::new(
                    InMemorySchemaStore::new().with_retention(retention).with_ordering(self.ordering),
                ))
            }
            StoreType::Sqlite => {
                let config =
                    self.sqlite_config().map_err(|err| StoreError::Invalid(err.to_string()))?;
                info!(
                    path = %config.path.display(),
                    retention_days = config.retention_days,
                    "opening sqlite schema store"
                );
                let store = SqliteSchemaStore::new(config)?;
                Ok(Box::new(store))
            }
        }
    }
}

/// Schema store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use `SQLite`-backed durable store.
    Sqlite,
}

// ============================================================================
// SECTION: Logging Config
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directives used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Validates logging configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the filter does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging filter must be non-empty".to_string()));
        }
        EnvFilter::try_new(&self.filter)
            .map_err(|err| ConfigError::Invalid(format!("logging filter is invalid: {err}")))?;
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable text lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from an explicit path or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Default busy timeout for `SQLite` connections.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default retention window in days.
const fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

/// Default maximum snapshot payload size.
const fn default_max_snapshot_bytes() -> usize {
    DEFAULT_MAX_SNAPSHOT_BYTES
}

/// Default logging filter.
fn default_log_filter() -> String {
    "info".to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::validate_path;

    #[test]
    fn overlong_components_are_rejected() {
        let component = "c".repeat(300);
        assert!(validate_path(Path::new(&component)).is_err());
        assert!(validate_path(Path::new("schema-history.toml")).is_ok());
    }
}
