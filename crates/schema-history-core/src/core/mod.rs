// crates/schema-history-core/src/core/mod.rs
// ============================================================================
// Module: Schema History Core Types
// Description: Positions, records, hashing, and time values.
// Purpose: Provide stable, serializable types shared by every store backend.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Core types define stream positions, the schema record model, and the
//! time and hashing helpers backends use when persisting history.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod position;
pub mod record;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::hash_bytes;
pub use position::Position;
pub use record::RecordKind;
pub use record::SchemaRecord;
pub use record::SchemaSnapshot;
pub use record::SchemaStatement;
pub use time::Clock;
pub use time::MILLIS_PER_DAY;
pub use time::ManualClock;
pub use time::SystemClock;
pub use time::Timestamp;
