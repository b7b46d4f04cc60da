// crates/schema-history-core/src/lib.rs
// ============================================================================
// Module: Schema History Core Library
// Description: Public API surface for the schema history core.
// Purpose: Expose positions, records, the store contract, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Schema history core defines how a binlog replication engine persists
//! schema snapshots and DDL statements tagged with stream positions, and how it
//! reconstructs the schema in effect at a position after a restart. It is
//! backend-agnostic; durable backends implement [`SchemaStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::SchemaStore;
pub use interfaces::StoreError;
pub use runtime::DEFAULT_RETENTION_DAYS;
pub use runtime::InMemorySchemaStore;
pub use runtime::OrderingCheck;
pub use runtime::RetentionPolicy;
pub use runtime::SchemaReplay;
pub use runtime::StatementCursor;
pub use runtime::replay_schema;
