// crates/schema-history-core/src/core/position.rs
// ============================================================================
// Module: Binlog Position
// Description: Coordinates locating a point in the replicated source stream.
// Purpose: Provide an immutable, ordered position tag for schema records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Position`] identifies a point in the source stream as a source server
//! identity, a segment name, and a byte offset inside that segment. Positions
//! order by segment sequence (the numeric suffix of the segment name) and then
//! by offset. Positions from different servers are incomparable: records from
//! distinct source identities are never ordered against each other.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Position
// ============================================================================

/// Position of an event in the source replication stream.
///
/// # Invariants
/// - Values are immutable once constructed.
/// - `partial_cmp` returns `None` when `server_id` differs.
/// - For a shared `server_id`, ordering is total and consistent with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Server identifier of the source that produced the stream.
    pub server_id: u32,
    /// Segment name, usually a file name with a numeric suffix (`mysql-bin.000042`).
    pub name: String,
    /// Byte offset within the segment.
    pub offset: u64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(server_id: u32, name: impl Into<String>, offset: u64) -> Self {
        Self {
            server_id,
            name: name.into(),
            offset,
        }
    }

    /// Returns the numeric suffix of the segment name, if any.
    ///
    /// The suffix is the run of ASCII digits after the last `.` in the name.
    /// Names without a dot, with a non-numeric suffix, or with a suffix that
    /// overflows `u64` yield `None`.
    #[must_use]
    pub fn segment_sequence(&self) -> Option<u64> {
        segment_sequence(&self.name)
    }

    /// Compares two positions that share a server identity.
    fn cmp_within_server(&self, other: &Self) -> Ordering {
        self.segment_sequence()
            .cmp(&other.segment_sequence())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.offset.cmp(&other.offset))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.server_id != other.server_id {
            return None;
        }
        Some(self.cmp_within_server(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.server_id, self.name, self.offset)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses the numeric suffix of a segment name.
#[must_use]
pub fn segment_sequence(name: &str) -> Option<u64> {
    let (_, suffix) = name.rsplit_once('.')?;
    if suffix.is_empty() || !suffix.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::segment_sequence;

    #[test]
    fn parses_numeric_suffix() {
        assert_eq!(segment_sequence("mysql-bin.000042"), Some(42));
        assert_eq!(segment_sequence("bin.1000000"), Some(1_000_000));
    }

    #[test]
    fn rejects_missing_or_non_numeric_suffix() {
        assert_eq!(segment_sequence("binlog"), None);
        assert_eq!(segment_sequence("bin."), None);
        assert_eq!(segment_sequence("bin.00a1"), None);
        assert_eq!(segment_sequence("bin.+12"), None);
        assert_eq!(segment_sequence("bin.99999999999999999999999"), None);
    }
}
