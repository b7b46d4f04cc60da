// crates/schema-history-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Schema Store
// Description: Durable SchemaStore backend using SQLite WAL.
// Purpose: Provide crash-safe persistence for schema snapshots and DDL history.
// Dependencies: schema-history-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`SchemaStore`] implementation that
//! appends schema snapshots and DDL statements to a single history table.
//! Snapshot saves purge expired history inside the same transaction, so a
//! crash never leaves a new snapshot without its purge or the reverse.
//!
//! [`SchemaStore`]: schema_history_core::SchemaStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_BUSY_TIMEOUT_MS;
pub use store::DEFAULT_MAX_SNAPSHOT_BYTES;
pub use store::MAX_SNAPSHOT_BYTES;
pub use store::SqliteSchemaStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use store::validate_store_path;
