// crates/schema-history-core/src/runtime/mod.rs
// ============================================================================
// Module: Schema History Runtime
// Description: Retention, ordering, replay, and the in-memory store.
// Purpose: Share store semantics across backends.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the behavior every backend must agree on: the
//! retention rule, the optional ordering check, and restart-time replay.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod ordering;
pub mod replay;
pub mod retention;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use ordering::OrderingCheck;
pub use replay::SchemaReplay;
pub use replay::StatementCursor;
pub use replay::replay_schema;
pub use retention::DEFAULT_RETENTION_DAYS;
pub use retention::RetentionPolicy;
pub use store::InMemorySchemaStore;
