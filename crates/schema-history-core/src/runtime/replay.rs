// crates/schema-history-core/src/runtime/replay.rs
// ============================================================================
// Module: Schema Replay
// Description: Restart-time reconstruction of schema history.
// Purpose: Load the latest snapshot and the statements that follow it.
// Dependencies: crate::core, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! On restart the replication engine loads the latest snapshot and then asks
//! the store for the next statement after the last position it applied, until
//! none remain. [`StatementCursor`] runs that loop lazily; [`replay_schema`]
//! collects it into a [`SchemaReplay`], optionally stopping at a target
//! position.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use tracing::debug;

use crate::core::Position;
use crate::core::SchemaSnapshot;
use crate::core::SchemaStatement;
use crate::interfaces::SchemaStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Statement Cursor
// ============================================================================

/// Iterator over statements stored after a position.
///
/// Each step chains the previous statement's position into the next
/// `load_next_statement` call. Iteration ends after the store reports no
/// further statement or after the first error.
pub struct StatementCursor<'a, S: SchemaStore + ?Sized> {
    /// Store being replayed.
    store: &'a S,
    /// Position of the last statement returned.
    after: Position,
    /// Set once the cursor is exhausted.
    done: bool,
}

impl<'a, S: SchemaStore + ?Sized> StatementCursor<'a, S> {
    /// Creates a cursor positioned after `after`.
    #[must_use]
    pub const fn new(store: &'a S, after: Position) -> Self {
        Self {
            store,
            after,
            done: false,
        }
    }

    /// Returns the position of the last statement yielded.
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.after
    }
}

impl<S: SchemaStore + ?Sized> Iterator for StatementCursor<'_, S> {
    type Item = Result<SchemaStatement, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.store.load_next_statement(&self.after) {
            Ok(Some(statement)) => {
                self.after = statement.position.clone();
                Some(Ok(statement))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

// ============================================================================
// SECTION: Replay
// ============================================================================

/// Snapshot plus the statements to apply on top of it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReplay {
    /// Latest stored snapshot.
    pub snapshot: SchemaSnapshot,
    /// Statements stored after the snapshot, in insertion order.
    pub statements: Vec<SchemaStatement>,
}

impl SchemaReplay {
    /// Returns the position the reconstructed schema is valid at.
    #[must_use]
    pub fn position(&self) -> &Position {
        self.statements.last().map_or(&self.snapshot.position, |statement| &statement.position)
    }
}

/// Reconstructs schema history from the latest snapshot forward.
///
/// Statements positioned after `until` are left unapplied. Returns `None` when
/// the store holds no snapshot.
///
/// # Errors
///
/// Returns [`StoreError`] when any store call fails.
pub fn replay_schema<S: SchemaStore + ?Sized>(
    store: &S,
    until: Option<&Position>,
) -> Result<Option<SchemaReplay>, StoreError> {
    let Some(snapshot) = store.load_last_snapshot()? else {
        debug!("no schema snapshot stored; nothing to replay");
        return Ok(None);
    };
    let mut statements = Vec::new();
    for statement in StatementCursor::new(store, snapshot.position.clone()) {
        let statement = statement?;
        if let Some(until) = until
            && !matches!(
                statement.position.partial_cmp(until),
                Some(Ordering::Less | Ordering::Equal)
            )
        {
            break;
        }
        statements.push(statement);
    }
    debug!(
        snapshot = %snapshot.position,
        statements = statements.len(),
        "replayed schema history"
    );
    Ok(Some(SchemaReplay {
        snapshot,
        statements,
    }))
}
