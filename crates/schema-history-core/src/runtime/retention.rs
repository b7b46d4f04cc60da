// crates/schema-history-core/src/runtime/retention.rs
// ============================================================================
// Module: Retention Policy
// Description: Age-based purge rule for schema history.
// Purpose: Bound history growth while keeping two snapshot generations.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! History is purged only while a snapshot is being saved. A record is
//! removed when it was inserted before the *previous* snapshot (the latest
//! snapshot prior to the one just saved) and its age has reached the retention
//! window. The previous snapshot and everything after it always survive, so
//! recovery can fall back one snapshot generation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::MILLIS_PER_DAY;
use crate::core::RecordKind;
use crate::core::SchemaRecord;
use crate::core::Timestamp;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default retention window in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

// ============================================================================
// SECTION: Retention Policy
// ============================================================================

/// Age threshold applied by the retention sweep.
///
/// # Invariants
/// - `max_age_ms` is always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Minimum record age, in milliseconds, before it may be purged.
    max_age_ms: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age_ms: i64::from(DEFAULT_RETENTION_DAYS) * MILLIS_PER_DAY,
        }
    }
}

impl RetentionPolicy {
    /// Builds a policy from a window expressed in days.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when `days` is zero.
    pub fn from_days(days: u32) -> Result<Self, StoreError> {
        if days == 0 {
            return Err(StoreError::Invalid(
                "retention window must be at least one day".to_string(),
            ));
        }
        Ok(Self {
            max_age_ms: i64::from(days) * MILLIS_PER_DAY,
        })
    }

    /// Returns the retention window in milliseconds.
    #[must_use]
    pub const fn max_age_ms(&self) -> i64 {
        self.max_age_ms
    }

    /// Returns the newest creation time that is already expired at `now`.
    #[must_use]
    pub const fn cutoff(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub_millis(self.max_age_ms)
    }

    /// Returns true when a record created at `created_at` is expired at `now`.
    #[must_use]
    pub fn is_expired(&self, created_at: Timestamp, now: Timestamp) -> bool {
        created_at <= self.cutoff(now)
    }
}

// ============================================================================
// SECTION: Sweep Helpers
// ============================================================================

/// Returns the insertion id of the latest snapshot inserted before `new_id`.
#[must_use]
pub fn previous_snapshot_id(records: &[SchemaRecord], new_id: i64) -> Option<i64> {
    records
        .iter()
        .filter(|record| record.kind == RecordKind::Snapshot && record.insertion_id < new_id)
        .map(|record| record.insertion_id)
        .max()
}

/// Applies the retention sweep after the snapshot `new_id` was appended.
///
/// Returns the number of purged records.
pub fn purge_expired(
    records: &mut Vec<SchemaRecord>,
    new_id: i64,
    policy: RetentionPolicy,
    now: Timestamp,
) -> usize {
    let Some(boundary) = previous_snapshot_id(records, new_id) else {
        return 0;
    };
    let before = records.len();
    records.retain(|record| {
        record.insertion_id >= boundary || !policy.is_expired(record.created_at, now)
    });
    before - records.len()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::RetentionPolicy;
    use crate::core::MILLIS_PER_DAY;
    use crate::core::Timestamp;

    #[test]
    fn zero_day_window_is_rejected() {
        assert!(RetentionPolicy::from_days(0).is_err());
    }

    #[test]
    fn expiry_is_inclusive_at_the_window_edge() {
        let policy = RetentionPolicy::default();
        let now = Timestamp::from_unix_millis(30 * MILLIS_PER_DAY);
        let edge = Timestamp::from_unix_millis(23 * MILLIS_PER_DAY);
        let fresh = Timestamp::from_unix_millis(23 * MILLIS_PER_DAY + 1);
        assert!(policy.is_expired(edge, now));
        assert!(!policy.is_expired(fresh, now));
    }
}
