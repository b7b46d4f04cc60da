// crates/schema-history-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Schema Store
// Description: Volatile schema store for tests and dry runs.
// Purpose: Provide a dependency-free store with the durable store's semantics.
// Dependencies: crate::core, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! [`InMemorySchemaStore`] keeps the history in a mutex-guarded vector. It
//! applies the same retention sweep and ordering check as the durable backend
//! but loses everything when dropped. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use tracing::debug;
use tracing::info;

use crate::core::Clock;
use crate::core::Position;
use crate::core::RecordKind;
use crate::core::SchemaRecord;
use crate::core::SchemaSnapshot;
use crate::core::SchemaStatement;
use crate::core::SystemClock;
use crate::interfaces::SchemaStore;
use crate::interfaces::StoreError;
use crate::runtime::ordering::OrderingCheck;
use crate::runtime::retention::RetentionPolicy;
use crate::runtime::retention::purge_expired;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable history guarded by the store mutex.
#[derive(Debug)]
struct MemoryHistory {
    /// Records in insertion order.
    records: Vec<SchemaRecord>,
    /// Next insertion identifier; never reused, even across resets.
    next_id: i64,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl MemoryHistory {
    /// Allocates the next insertion identifier.
    fn allocate_id(&mut self) -> Result<i64, StoreError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::Persistence("insertion id overflow".to_string()))?;
        Ok(id)
    }

    /// Returns the position of the newest record from `server_id`.
    fn latest_position(&self, server_id: u32) -> Option<&Position> {
        self.records
            .iter()
            .rev()
            .map(|record| &record.position)
            .find(|position| position.server_id == server_id)
    }
}

/// In-memory schema store for tests and dry runs.
#[derive(Clone)]
pub struct InMemorySchemaStore {
    /// History protected by a mutex.
    history: Arc<Mutex<MemoryHistory>>,
    /// Time source for record stamping and retention.
    clock: Arc<dyn Clock>,
    /// Retention window applied on snapshot saves.
    retention: RetentionPolicy,
    /// Ordering validation applied on saves.
    ordering: OrderingCheck,
}

impl Default for InMemorySchemaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySchemaStore {
    /// Creates an empty store using the system clock and default retention.
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: Arc::new(Mutex::new(MemoryHistory::default())),
            clock: Arc::new(SystemClock),
            retention: RetentionPolicy::default(),
            ordering: OrderingCheck::default(),
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the retention policy.
    #[must_use]
    pub const fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Replaces the ordering check.
    #[must_use]
    pub const fn with_ordering(mut self, ordering: OrderingCheck) -> Self {
        self.ordering = ordering;
        self
    }

    /// Returns a copy of every stored record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the store mutex is poisoned.
    pub fn records(&self) -> Result<Vec<SchemaRecord>, StoreError> {
        Ok(self.lock()?.records.clone())
    }

    /// Locks the history.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryHistory>, StoreError> {
        self.history
            .lock()
            .map_err(|_| StoreError::Persistence("schema store mutex poisoned".to_string()))
    }
}

impl SchemaStore for InMemorySchemaStore {
    fn save_snapshot(&self, schema: &[u8], position: &Position) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut guard = self.lock()?;
        self.ordering.check(guard.latest_position(position.server_id), position)?;
        let id = guard.allocate_id()?;
        guard.records.push(SchemaRecord::snapshot(id, position.clone(), schema.to_vec(), now));
        let purged = purge_expired(&mut guard.records, id, self.retention, now);
        drop(guard);
        info!(insertion_id = id, %position, purged, "saved schema snapshot");
        Ok(())
    }

    fn load_last_snapshot(&self) -> Result<Option<SchemaSnapshot>, StoreError> {
        let guard = self.lock()?;
        let snapshot = guard
            .records
            .iter()
            .rev()
            .find(|record| record.kind == RecordKind::Snapshot)
            .and_then(SchemaRecord::as_snapshot);
        drop(guard);
        debug!(found = snapshot.is_some(), "loaded last schema snapshot");
        Ok(snapshot)
    }

    fn save_statement(
        &self,
        database: &str,
        statement: &str,
        position: &Position,
    ) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut guard = self.lock()?;
        self.ordering.check(guard.latest_position(position.server_id), position)?;
        let id = guard.allocate_id()?;
        guard.records.push(SchemaRecord::statement(
            id,
            position.clone(),
            database.to_string(),
            statement.to_string(),
            now,
        ));
        drop(guard);
        debug!(insertion_id = id, %position, "saved schema statement");
        Ok(())
    }

    fn load_next_statement(&self, after: &Position) -> Result<Option<SchemaStatement>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .records
            .iter()
            .filter(|record| record.kind == RecordKind::Statement)
            .find(|record| record.position > *after)
            .and_then(SchemaRecord::as_statement))
    }

    fn reset(&self) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let removed = guard.records.len();
        guard.records.clear();
        drop(guard);
        info!(removed, "reset schema history");
        Ok(())
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
