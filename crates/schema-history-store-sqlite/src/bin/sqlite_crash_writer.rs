//! `SQLite` crash writer for store durability tests.
// crates/schema-history-store-sqlite/src/bin/sqlite_crash_writer.rs
// ============================================================================
// Binary: SQLite Crash Writer
// Description: Simulates a crash during an uncommitted snapshot write.
// Purpose: Support durability tests for rollback/crash recovery behavior.
// Dependencies: schema-history-core, schema-history-store-sqlite, rusqlite
// ============================================================================

use std::env;
use std::path::PathBuf;

use rusqlite::params;
use schema_history_core::DEFAULT_HASH_ALGORITHM;
use schema_history_core::RecordKind;
use schema_history_core::hash_bytes;
use schema_history_store_sqlite::SqliteSchemaStore;
use schema_history_store_sqlite::SqliteStoreConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing sqlite path")
    })?;
    let payload = args.next().unwrap_or_else(|| "CRASHED".to_string());
    let path = PathBuf::from(path);

    let _store = SqliteSchemaStore::new(SqliteStoreConfig::new(path.clone()))?;
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, payload.as_bytes());

    let mut conn = rusqlite::Connection::open(&path)?;
    conn.execute_batch("PRAGMA journal_mode = wal; PRAGMA synchronous = full;")?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO schema_history (server_id, name, segment_seq, pos, snapshot_payload, \
         snapshot_hash, hash_algorithm, statement_text, database_name, kind, created_at) VALUES \
         (1, 'bin.999999', 999999, 4, ?1, ?2, ?3, X'', '', ?4, 0)",
        params![
            payload.as_bytes(),
            digest.value,
            digest.algorithm.label(),
            RecordKind::Snapshot.as_str()
        ],
    )?;
    tx.execute("DELETE FROM schema_history WHERE kind = 'statement'", params![])?;

    std::process::abort();
}
