// crates/schema-history-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Schema Store
// Description: Durable SchemaStore backed by SQLite WAL.
// Purpose: Persist schema snapshots and DDL statements with transactional purge.
// Dependencies: schema-history-core, rusqlite, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! This module implements a durable [`SchemaStore`] using `SQLite`. Records
//! are appended to a single `schema_history` table whose `AUTOINCREMENT` key
//! is the durable order of the history. Snapshot saves and the retention
//! sweep share one transaction. Snapshot payloads are hashed on save and
//! verified on load, failing closed on corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::params;
use schema_history_core::Clock;
use schema_history_core::DEFAULT_HASH_ALGORITHM;
use schema_history_core::DEFAULT_RETENTION_DAYS;
use schema_history_core::HashAlgorithm;
use schema_history_core::OrderingCheck;
use schema_history_core::Position;
use schema_history_core::RecordKind;
use schema_history_core::RetentionPolicy;
use schema_history_core::SchemaRecord;
use schema_history_core::SchemaSnapshot;
use schema_history_core::SchemaStatement;
use schema_history_core::SchemaStore;
use schema_history_core::StoreError;
use schema_history_core::SystemClock;
use schema_history_core::Timestamp;
use schema_history_core::hash_bytes;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use tracing::error;
use tracing::info;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Stored segment sequence for names without a numeric suffix.
const NO_SEGMENT_SEQUENCE: i64 = -1;
/// Default maximum snapshot payload size accepted by the store.
pub const DEFAULT_MAX_SNAPSHOT_BYTES: usize = 64 * 1024 * 1024;
/// Hard upper bound for configurable snapshot payload limits.
pub const MAX_SNAPSHOT_BYTES: usize = 512 * 1024 * 1024;

/// Columns selected when decoding full records.
const RECORD_COLUMNS: &str = "insertion_id, server_id, name, pos, kind, snapshot_payload, \
                              database_name, statement_text, created_at";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` schema store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `retention_days` must be greater than zero.
/// - `max_snapshot_bytes` must be greater than zero and no more than
///   [`MAX_SNAPSHOT_BYTES`].
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Minimum age in days before history older than the previous snapshot is purged.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Maximum snapshot payload size in bytes.
    #[serde(default = "default_max_snapshot_bytes")]
    pub max_snapshot_bytes: usize,
    /// Ordering validation applied on saves.
    #[serde(default)]
    pub ordering: OrderingCheck,
}

impl SqliteStoreConfig {
    /// Returns a configuration for `path` with default settings.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            retention_days: DEFAULT_RETENTION_DAYS,
            max_snapshot_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
            ordering: OrderingCheck::default(),
        }
    }

    /// Validates limits in the store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when a limit is out of range.
    pub fn validate(&self) -> Result<(), SqliteStoreError> {
        if self.retention_days == 0 {
            return Err(SqliteStoreError::Invalid(
                "retention_days must be greater than zero".to_string(),
            ));
        }
        if self.max_snapshot_bytes == 0 || self.max_snapshot_bytes > MAX_SNAPSHOT_BYTES {
            return Err(SqliteStoreError::Invalid(format!(
                "max_snapshot_bytes out of range: {} (max {MAX_SNAPSHOT_BYTES})",
                self.max_snapshot_bytes
            )));
        }
        Ok(())
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default retention window in days.
const fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

/// Returns the default maximum snapshot payload size.
const fn default_max_snapshot_bytes() -> usize {
    DEFAULT_MAX_SNAPSHOT_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding snapshot payloads.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// Database could not be opened or configured.
    #[error("sqlite store connection error: {0}")]
    Connection(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// Save rejected by the ordering check.
    #[error(transparent)]
    Ordering(StoreError),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) | SqliteStoreError::Connection(message) => {
                Self::Connection(message)
            }
            SqliteStoreError::Db(message) => Self::Persistence(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "snapshot payload exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
            SqliteStoreError::Ordering(error) => error,
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed schema store with WAL support.
///
/// # Invariants
/// - Snapshot loads verify stored hashes before returning payloads.
/// - `SQLite` connection access is serialized through a mutex.
#[derive(Clone)]
pub struct SqliteSchemaStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Retention window derived from the configuration.
    retention: RetentionPolicy,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
    /// Time source for record stamping and retention.
    clock: Arc<dyn Clock>,
}

impl SqliteSchemaStore {
    /// Opens an `SQLite`-backed schema store, creating the table if absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the configuration is invalid or the
    /// database cannot be opened or initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        config.validate()?;
        let retention = RetentionPolicy::from_days(config.retention_days)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        debug!(path = %config.path.display(), "opened sqlite schema store");
        Ok(Self {
            config,
            retention,
            connection: Arc::new(Mutex::new(connection)),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Returns every stored record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or a row is invalid.
    pub fn records(&self) -> Result<Vec<SchemaRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM schema_history ORDER BY insertion_id ASC"
            ))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![], |row| Ok(decode_record(row)))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))??);
        }
        Ok(records)
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

impl SchemaStore for SqliteSchemaStore {
    fn save_snapshot(&self, schema: &[u8], position: &Position) -> Result<(), StoreError> {
        self.save_snapshot_record(schema, position).map_err(|err| {
            error!(%position, error = %err, "failed to save schema snapshot");
            StoreError::from(err)
        })
    }

    fn load_last_snapshot(&self) -> Result<Option<SchemaSnapshot>, StoreError> {
        self.load_snapshot_record().map_err(|err| {
            error!(error = %err, "failed to load last schema snapshot");
            StoreError::from(err)
        })
    }

    fn save_statement(
        &self,
        database: &str,
        statement: &str,
        position: &Position,
    ) -> Result<(), StoreError> {
        self.save_statement_record(database, statement, position).map_err(|err| {
            error!(%position, error = %err, "failed to save schema statement");
            StoreError::from(err)
        })
    }

    fn load_next_statement(&self, after: &Position) -> Result<Option<SchemaStatement>, StoreError> {
        self.load_statement_record(after).map_err(|err| {
            error!(%after, error = %err, "failed to load next schema statement");
            StoreError::from(err)
        })
    }

    fn reset(&self) -> Result<(), StoreError> {
        self.delete_all().map_err(|err| {
            error!(error = %err, "failed to reset schema history");
            StoreError::from(err)
        })
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
            .map_err(|err| StoreError::Persistence(err.to_string()))?;
        drop(guard);
        Ok(())
    }
}

impl SqliteSchemaStore {
    /// Inserts a snapshot record and purges expired history in one transaction.
    fn save_snapshot_record(
        &self,
        schema: &[u8],
        position: &Position,
    ) -> Result<(), SqliteStoreError> {
        if schema.len() > self.config.max_snapshot_bytes {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: self.config.max_snapshot_bytes,
                actual_bytes: schema.len(),
            });
        }
        let columns = PositionColumns::encode(position)?;
        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, schema);
        let now = self.clock.now();
        let (insertion_id, purged) = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            self.check_ordering(&tx, position)?;
            tx.execute(
                "INSERT INTO schema_history (server_id, name, segment_seq, pos, \
                 snapshot_payload, snapshot_hash, hash_algorithm, statement_text, database_name, \
                 kind, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, X'', '', ?8, ?9)",
                params![
                    columns.server_id,
                    position.name,
                    columns.segment_seq,
                    columns.offset,
                    schema,
                    digest.value,
                    digest.algorithm.label(),
                    RecordKind::Snapshot.as_str(),
                    now.as_unix_millis()
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let insertion_id = tx.last_insert_rowid();
            let purged = purge_expired(&tx, insertion_id, self.retention.cutoff(now))?;
            tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            drop(guard);
            (insertion_id, purged)
        };
        info!(insertion_id, %position, purged, "saved schema snapshot");
        Ok(())
    }

    /// Loads the latest snapshot record and verifies its payload hash.
    fn load_snapshot_record(&self) -> Result<Option<SchemaSnapshot>, SqliteStoreError> {
        let row = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let metadata = tx
                .query_row(
                    "SELECT insertion_id, server_id, name, pos, created_at, \
                     length(snapshot_payload), snapshot_hash, hash_algorithm FROM schema_history \
                     WHERE kind = 'snapshot' ORDER BY insertion_id DESC LIMIT 1",
                    params![],
                    |row| {
                        Ok(SnapshotMetadata {
                            insertion_id: row.get(0)?,
                            server_id: row.get(1)?,
                            name: row.get(2)?,
                            offset: row.get(3)?,
                            created_at: row.get(4)?,
                            length: row.get(5)?,
                            hash: row.get(6)?,
                            algorithm: row.get(7)?,
                        })
                    },
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let row = if let Some(metadata) = metadata {
                let length = usize::try_from(metadata.length).map_err(|_| {
                    SqliteStoreError::Corrupt(format!(
                        "negative snapshot length for record {}",
                        metadata.insertion_id
                    ))
                })?;
                if length > self.config.max_snapshot_bytes {
                    return Err(SqliteStoreError::TooLarge {
                        max_bytes: self.config.max_snapshot_bytes,
                        actual_bytes: length,
                    });
                }
                let payload: Vec<u8> = tx
                    .query_row(
                        "SELECT snapshot_payload FROM schema_history WHERE insertion_id = ?1",
                        params![metadata.insertion_id],
                        |row| row.get(0),
                    )
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                Some((metadata, payload))
            } else {
                None
            };
            tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            drop(guard);
            row
        };
        let Some((metadata, payload)) = row else {
            debug!("no schema snapshot stored");
            return Ok(None);
        };
        let algorithm: HashAlgorithm =
            metadata.algorithm.parse().map_err(SqliteStoreError::Invalid)?;
        let expected = hash_bytes(algorithm, &payload);
        if expected.value != metadata.hash {
            return Err(SqliteStoreError::Corrupt(format!(
                "hash mismatch for snapshot record {}",
                metadata.insertion_id
            )));
        }
        let position = decode_position(metadata.server_id, metadata.name, metadata.offset)?;
        debug!(insertion_id = metadata.insertion_id, %position, "loaded last schema snapshot");
        Ok(Some(SchemaSnapshot {
            insertion_id: metadata.insertion_id,
            position,
            payload,
            created_at: Timestamp::from_unix_millis(metadata.created_at),
        }))
    }

    /// Inserts a statement record.
    fn save_statement_record(
        &self,
        database: &str,
        statement: &str,
        position: &Position,
    ) -> Result<(), SqliteStoreError> {
        let columns = PositionColumns::encode(position)?;
        let now = self.clock.now();
        let insertion_id = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            self.check_ordering(&tx, position)?;
            tx.execute(
                "INSERT INTO schema_history (server_id, name, segment_seq, pos, \
                 snapshot_payload, snapshot_hash, hash_algorithm, statement_text, database_name, \
                 kind, created_at) VALUES (?1, ?2, ?3, ?4, X'', '', '', ?5, ?6, ?7, ?8)",
                params![
                    columns.server_id,
                    position.name,
                    columns.segment_seq,
                    columns.offset,
                    statement.as_bytes(),
                    database,
                    RecordKind::Statement.as_str(),
                    now.as_unix_millis()
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let insertion_id = tx.last_insert_rowid();
            tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            drop(guard);
            insertion_id
        };
        debug!(insertion_id, %position, database, "saved schema statement");
        Ok(())
    }

    /// Loads the earliest-inserted statement positioned after `after`.
    fn load_statement_record(
        &self,
        after: &Position,
    ) -> Result<Option<SchemaStatement>, SqliteStoreError> {
        let Some(columns) = PositionColumns::lookup_bound(after) else {
            return Ok(None);
        };
        let guard = self.lock()?;
        let record = guard
            .query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM schema_history WHERE kind = 'statement' AND \
                     server_id = ?1 AND (segment_seq, name, pos) > (?2, ?3, ?4) ORDER BY \
                     insertion_id ASC LIMIT 1"
                ),
                params![columns.server_id, columns.segment_seq, after.name, columns.offset],
                |row| Ok(decode_record(row)),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        let Some(record) = record.transpose()? else {
            return Ok(None);
        };
        Ok(record.as_statement())
    }

    /// Deletes every record.
    fn delete_all(&self) -> Result<(), SqliteStoreError> {
        let removed = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let removed = tx
                .execute("DELETE FROM schema_history", params![])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            drop(guard);
            removed
        };
        info!(removed, "reset schema history");
        Ok(())
    }

    /// Applies the configured ordering check against the newest stored record.
    fn check_ordering(
        &self,
        tx: &Transaction<'_>,
        position: &Position,
    ) -> Result<(), SqliteStoreError> {
        if self.config.ordering == OrderingCheck::Relaxed {
            return Ok(());
        }
        let latest = tx
            .query_row(
                "SELECT server_id, name, pos FROM schema_history WHERE server_id = ?1 ORDER BY \
                 insertion_id DESC LIMIT 1",
                params![i64::from(position.server_id)],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?)),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let latest = latest
            .map(|(server_id, name, offset)| decode_position(server_id, name, offset))
            .transpose()?;
        self.config.ordering.check(latest.as_ref(), position).map_err(SqliteStoreError::Ordering)
    }
}

// ============================================================================
// SECTION: Row Encoding
// ============================================================================

/// Snapshot metadata read before the payload itself.
struct SnapshotMetadata {
    /// Insertion identifier.
    insertion_id: i64,
    /// Stored server identifier.
    server_id: i64,
    /// Segment name.
    name: String,
    /// Stored segment offset.
    offset: i64,
    /// Creation time in unix milliseconds.
    created_at: i64,
    /// Payload length in bytes.
    length: i64,
    /// Stored payload hash.
    hash: String,
    /// Stored hash algorithm label.
    algorithm: String,
}

/// Integer columns derived from a position.
struct PositionColumns {
    /// Server identifier column value.
    server_id: i64,
    /// Parsed segment suffix, or [`NO_SEGMENT_SEQUENCE`].
    segment_seq: i64,
    /// Offset column value.
    offset: i64,
}

impl PositionColumns {
    /// Encodes a position into column values.
    fn encode(position: &Position) -> Result<Self, SqliteStoreError> {
        let segment_seq = match position.segment_sequence() {
            Some(sequence) => i64::try_from(sequence).map_err(|_| {
                SqliteStoreError::Invalid(format!(
                    "segment sequence out of range in position {position}"
                ))
            })?,
            None => NO_SEGMENT_SEQUENCE,
        };
        let offset = i64::try_from(position.offset).map_err(|_| {
            SqliteStoreError::Invalid(format!("offset out of range in position {position}"))
        })?;
        Ok(Self {
            server_id: i64::from(position.server_id),
            segment_seq,
            offset,
        })
    }

    /// Encodes a lower bound for forward lookups.
    ///
    /// Stored columns never exceed `i64::MAX`, so an offset beyond it is
    /// clamped and a segment sequence beyond it has no successor (`None`).
    fn lookup_bound(position: &Position) -> Option<Self> {
        let segment_seq = match position.segment_sequence() {
            Some(sequence) => i64::try_from(sequence).ok()?,
            None => NO_SEGMENT_SEQUENCE,
        };
        Some(Self {
            server_id: i64::from(position.server_id),
            segment_seq,
            offset: i64::try_from(position.offset).unwrap_or(i64::MAX),
        })
    }
}

/// Decodes stored position columns.
fn decode_position(server_id: i64, name: String, offset: i64) -> Result<Position, SqliteStoreError> {
    let server_id = u32::try_from(server_id)
        .map_err(|_| SqliteStoreError::Corrupt(format!("invalid stored server_id {server_id}")))?;
    let offset = u64::try_from(offset)
        .map_err(|_| SqliteStoreError::Corrupt(format!("invalid stored offset {offset}")))?;
    Ok(Position::new(server_id, name, offset))
}

/// Decodes a row selected with [`RECORD_COLUMNS`].
fn decode_record(row: &Row<'_>) -> Result<SchemaRecord, SqliteStoreError> {
    let column = |err: rusqlite::Error| SqliteStoreError::Db(err.to_string());
    let insertion_id: i64 = row.get(0).map_err(column)?;
    let position = decode_position(
        row.get(1).map_err(column)?,
        row.get(2).map_err(column)?,
        row.get(3).map_err(column)?,
    )?;
    let kind: String = row.get(4).map_err(column)?;
    let kind: RecordKind = kind.parse().map_err(SqliteStoreError::Corrupt)?;
    let payload: Vec<u8> = row.get(5).map_err(column)?;
    let database: String = row.get(6).map_err(column)?;
    let statement_text: Vec<u8> = row.get(7).map_err(column)?;
    let statement_text = String::from_utf8(statement_text).map_err(|_| {
        SqliteStoreError::Corrupt(format!("statement text is not utf-8 in record {insertion_id}"))
    })?;
    let created_at = Timestamp::from_unix_millis(row.get(8).map_err(column)?);
    Ok(match kind {
        RecordKind::Snapshot => SchemaRecord::snapshot(insertion_id, position, payload, created_at),
        RecordKind::Statement => {
            SchemaRecord::statement(insertion_id, position, database, statement_text, created_at)
        }
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Invalid`] when the path is blank, exceeds
/// length limits, or names an existing directory.
pub fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.trim().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must be non-empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Connection(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Connection(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Connection(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Connection(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS schema_history (
                    insertion_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    server_id INTEGER NOT NULL DEFAULT 0,
                    name TEXT NOT NULL DEFAULT '',
                    segment_seq INTEGER NOT NULL DEFAULT -1,
                    pos INTEGER NOT NULL DEFAULT 0,
                    snapshot_payload BLOB NOT NULL,
                    snapshot_hash TEXT NOT NULL DEFAULT '',
                    hash_algorithm TEXT NOT NULL DEFAULT '',
                    statement_text BLOB NOT NULL,
                    database_name TEXT NOT NULL DEFAULT '',
                    kind TEXT NOT NULL DEFAULT 'snapshot'
                        CHECK (kind IN ('snapshot', 'statement')),
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_schema_history_kind
                    ON schema_history (kind, insertion_id);
                CREATE INDEX IF NOT EXISTS idx_schema_history_position
                    ON schema_history (server_id, segment_seq, name, pos);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Purges history older than the previous snapshot and the retention cutoff.
///
/// Returns the number of deleted records.
fn purge_expired(
    tx: &Transaction<'_>,
    new_snapshot_id: i64,
    cutoff: Timestamp,
) -> Result<usize, SqliteStoreError> {
    let previous_snapshot_id: Option<i64> = tx
        .query_row(
            "SELECT insertion_id FROM schema_history WHERE kind = 'snapshot' AND insertion_id < \
             ?1 ORDER BY insertion_id DESC LIMIT 1",
            params![new_snapshot_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let Some(previous_snapshot_id) = previous_snapshot_id else {
        return Ok(0);
    };
    tx.execute(
        "DELETE FROM schema_history WHERE insertion_id < ?1 AND created_at <= ?2",
        params![previous_snapshot_id, cutoff.as_unix_millis()],
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))
}
