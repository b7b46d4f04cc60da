// crates/schema-history-config/src/lib.rs
// ============================================================================
// Module: Schema History Config Library
// Description: Config model, validation, store construction, and logging.
// Purpose: Single source of truth for schema-history.toml semantics.
// Dependencies: schema-history-core, schema-history-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `schema-history-config` defines the configuration model for the schema
//! history store. It loads `schema-history.toml` with strict, fail-closed
//! validation, builds the configured [`SchemaStore`] backend, and installs
//! the `tracing` subscriber described by the `[logging]` section.
//!
//! [`SchemaStore`]: schema_history_core::SchemaStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod logging;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use logging::LoggingError;
pub use logging::init_tracing;
