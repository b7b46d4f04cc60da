// crates/schema-history-core/src/core/record.rs
// ============================================================================
// Module: Schema Records
// Description: Persisted snapshot and statement records.
// Purpose: Model the append-only schema history rows and their outbound views.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The schema history is an append-only sequence of [`SchemaRecord`]s. Each
//! record is either a full schema snapshot or a single DDL statement, stamped
//! with the stream [`Position`] it was observed at and a store-assigned
//! insertion identifier that totally orders the history.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::core::position::Position;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Record Kind
// ============================================================================

/// Kind of a schema history record.
///
/// # Invariants
/// - Labels map 1:1 to the persisted `kind` column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Full serialized schema state.
    Snapshot,
    /// Single schema-altering statement.
    Statement,
}

impl RecordKind {
    /// Returns the persisted label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Statement => "statement",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "snapshot" => Ok(Self::Snapshot),
            "statement" => Ok(Self::Statement),
            other => Err(format!("unknown record kind: {other}")),
        }
    }
}

// ============================================================================
// SECTION: Schema Record
// ============================================================================

/// One persisted schema history row.
///
/// # Invariants
/// - `insertion_id` is strictly increasing across the history.
/// - Snapshots carry `payload`; `database` and `statement_text` are empty.
/// - Statements carry `database` and `statement_text`; `payload` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// Store-assigned insertion identifier.
    pub insertion_id: i64,
    /// Stream position the record was observed at.
    pub position: Position,
    /// Record kind.
    pub kind: RecordKind,
    /// Serialized schema state for snapshots.
    pub payload: Vec<u8>,
    /// Database the statement applies to.
    pub database: String,
    /// Statement text.
    pub statement_text: String,
    /// Creation time.
    pub created_at: Timestamp,
}

impl SchemaRecord {
    /// Builds a snapshot record.
    #[must_use]
    pub fn snapshot(
        insertion_id: i64,
        position: Position,
        payload: Vec<u8>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            insertion_id,
            position,
            kind: RecordKind::Snapshot,
            payload,
            database: String::new(),
            statement_text: String::new(),
            created_at,
        }
    }

    /// Builds a statement record.
    #[must_use]
    pub fn statement(
        insertion_id: i64,
        position: Position,
        database: String,
        statement_text: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            insertion_id,
            position,
            kind: RecordKind::Statement,
            payload: Vec::new(),
            database,
            statement_text,
            created_at,
        }
    }

    /// Returns the snapshot view when this record is a snapshot.
    #[must_use]
    pub fn as_snapshot(&self) -> Option<SchemaSnapshot> {
        match self.kind {
            RecordKind::Snapshot => Some(SchemaSnapshot {
                insertion_id: self.insertion_id,
                position: self.position.clone(),
                payload: self.payload.clone(),
                created_at: self.created_at,
            }),
            RecordKind::Statement => None,
        }
    }

    /// Returns the statement view when this record is a statement.
    #[must_use]
    pub fn as_statement(&self) -> Option<SchemaStatement> {
        match self.kind {
            RecordKind::Snapshot => None,
            RecordKind::Statement => Some(SchemaStatement {
                insertion_id: self.insertion_id,
                database: self.database.clone(),
                statement: self.statement_text.clone(),
                position: self.position.clone(),
                created_at: self.created_at,
            }),
        }
    }
}

// ============================================================================
// SECTION: Outbound Views
// ============================================================================

/// Full schema snapshot returned to the replay component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Insertion identifier of the snapshot record.
    pub insertion_id: i64,
    /// Position the snapshot was taken at.
    pub position: Position,
    /// Serialized schema state.
    pub payload: Vec<u8>,
    /// Creation time.
    pub created_at: Timestamp,
}

/// DDL statement returned to the replay component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaStatement {
    /// Insertion identifier of the statement record.
    pub insertion_id: i64,
    /// Database the statement applies to.
    pub database: String,
    /// Statement text.
    pub statement: String,
    /// Position the statement was observed at.
    pub position: Position,
    /// Creation time.
    pub created_at: Timestamp,
}
