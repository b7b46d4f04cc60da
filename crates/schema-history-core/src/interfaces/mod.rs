// crates/schema-history-core/src/interfaces/mod.rs
// ============================================================================
// Module: Schema History Interfaces
// Description: Backend-agnostic storage contract for schema history.
// Purpose: Define the surface the replication engine persists schema through.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`SchemaStore`] is the contract every persistence backend implements. The
//! replication engine saves snapshots periodically and statements as DDL is
//! observed; on restart it loads the latest snapshot and replays statements
//! forward one at a time. Empty-history outcomes are `Ok(None)`, so callers can
//! tell "no history yet" apart from a failing backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Position;
use crate::core::SchemaSnapshot;
use crate::core::SchemaStatement;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never embed snapshot payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend unreachable when the store was opened.
    #[error("schema store connection error: {0}")]
    Connection(String),
    /// Write or transaction failure; nothing from the operation was applied.
    #[error("schema store persistence error: {0}")]
    Persistence(String),
    /// Stored data failed an integrity check.
    #[error("schema store corruption: {0}")]
    Corrupt(String),
    /// Stored schema version is not supported.
    #[error("schema store version mismatch: {0}")]
    VersionMismatch(String),
    /// Input or stored data is invalid.
    #[error("schema store invalid data: {0}")]
    Invalid(String),
    /// Strict ordering rejected an out-of-order save.
    #[error("schema store invariant violation: {0}")]
    InvariantViolation(String),
}

// ============================================================================
// SECTION: Schema Store
// ============================================================================

/// Durable schema history store.
///
/// Callers must serialize `save_*` calls and issue them in stream order; the
/// insertion order is the durable order of the history.
pub trait SchemaStore {
    /// Persists a full schema snapshot taken at `position`, then purges
    /// expired history in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the snapshot or the purge cannot be
    /// persisted; neither takes effect in that case.
    fn save_snapshot(&self, schema: &[u8], position: &Position) -> Result<(), StoreError>;

    /// Loads the most recently saved snapshot, or `None` when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails or the snapshot is corrupt.
    fn load_last_snapshot(&self) -> Result<Option<SchemaSnapshot>, StoreError>;

    /// Persists a DDL statement observed at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the statement cannot be persisted.
    fn save_statement(
        &self,
        database: &str,
        statement: &str,
        position: &Position,
    ) -> Result<(), StoreError>;

    /// Loads the earliest-inserted statement positioned strictly after
    /// `after`, or `None` when no such statement exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn load_next_statement(&self, after: &Position) -> Result<Option<SchemaStatement>, StoreError>;

    /// Irreversibly deletes the entire history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn reset(&self) -> Result<(), StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
