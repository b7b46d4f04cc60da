// crates/schema-history-core/src/runtime/ordering.rs
// ============================================================================
// Module: Insertion Ordering Check
// Description: Optional stream-order validation for saves.
// Purpose: Detect callers that insert history out of stream order.
// Dependencies: crate::core, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! Stores trust callers to save records in stream order. With
//! [`OrderingCheck::Strict`] a save is rejected when its position does not
//! come strictly after the latest stored position of the same server.
//! Positions from another server are incomparable and always accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;

use crate::core::Position;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Ordering Check
// ============================================================================

/// Ordering validation applied to saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderingCheck {
    /// Trust the caller to insert in stream order.
    #[default]
    Relaxed,
    /// Reject saves that do not advance past the latest stored position.
    Strict,
}

impl OrderingCheck {
    /// Validates `next` against the latest stored position.
    ///
    /// Callers pass the latest position recorded for `next.server_id`; a
    /// `latest` from another server is accepted unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvariantViolation`] in strict mode when `next`
    /// does not advance past `latest`.
    pub fn check(self, latest: Option<&Position>, next: &Position) -> Result<(), StoreError> {
        let Self::Strict = self else {
            return Ok(());
        };
        let Some(latest) = latest else {
            return Ok(());
        };
        if latest.server_id != next.server_id || next > latest {
            return Ok(());
        }
        Err(StoreError::InvariantViolation(format!(
            "position {next} does not advance past stored position {latest}"
        )))
    }
}
