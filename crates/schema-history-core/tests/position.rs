// crates/schema-history-core/tests/position.rs
// ============================================================================
// Module: Position Ordering Tests
// Description: Unit and property tests for stream position ordering.
// Purpose: Ensure positions order by segment sequence and offset per server.
// ============================================================================

//! Position ordering invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::cmp::Ordering;

use proptest::prelude::*;
use schema_history_core::Position;

// ============================================================================
// SECTION: Unit Tests
// ============================================================================

#[test]
fn offsets_order_within_a_segment() {
    let earlier = Position::new(1, "bin.000001", 100);
    let later = Position::new(1, "bin.000001", 200);
    assert!(earlier < later);
    assert!(later > earlier);
}

#[test]
fn segment_sequence_dominates_offset() {
    let end_of_first = Position::new(1, "bin.000001", 9_999_999);
    let start_of_second = Position::new(1, "bin.000002", 4);
    assert!(end_of_first < start_of_second);
}

#[test]
fn suffix_rollover_orders_numerically() {
    let before = Position::new(1, "bin.999999", 4);
    let after = Position::new(1, "bin.1000000", 4);
    assert!(before < after);
    assert!("bin.999999" > "bin.1000000");
}

#[test]
fn different_servers_are_incomparable() {
    let first = Position::new(1, "bin.000001", 100);
    let second = Position::new(2, "bin.000009", 100);
    assert_eq!(first.partial_cmp(&second), None);
    let less = first < second;
    let greater = first > second;
    assert!(!less);
    assert!(!greater);
    assert_ne!(first, second);
}

#[test]
fn names_without_suffix_sort_first() {
    let bare = Position::new(1, "relay", 500);
    let numbered = Position::new(1, "relay.000001", 4);
    assert!(bare < numbered);
}

#[test]
fn equal_positions_compare_equal() {
    let first = Position::new(7, "bin.000003", 42);
    let second = Position::new(7, "bin.000003", 42);
    assert_eq!(first.partial_cmp(&second), Some(Ordering::Equal));
}

#[test]
fn display_and_serde_forms() {
    let position = Position::new(3, "mysql-bin.000042", 1_024);
    assert_eq!(position.to_string(), "3:mysql-bin.000042:1024");
    let json = serde_json::to_string(&position).unwrap();
    assert_eq!(json, r#"{"server_id":3,"name":"mysql-bin.000042","offset":1024}"#);
    let parsed: Position = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, position);
}

// ============================================================================
// SECTION: Property Tests
// ============================================================================

fn position_strategy() -> impl Strategy<Value = Position> {
    let name = prop_oneof![
        (0_u64 .. 2_000_000).prop_map(|seq| format!("bin.{seq:06}")),
        Just("bin".to_string()),
        "[a-z]{1,4}\\.[0-9]{1,3}",
    ];
    (1_u32 .. 3, name, 0_u64 .. 1_000).prop_map(|(server_id, name, offset)| {
        Position::new(server_id, name, offset)
    })
}

proptest! {
    #[test]
    fn ordering_is_antisymmetric(a in position_strategy(), b in position_strategy()) {
        let forward = a.partial_cmp(&b);
        let backward = b.partial_cmp(&a);
        prop_assert_eq!(forward, backward.map(Ordering::reverse));
        prop_assert_eq!(forward.is_none(), a.server_id != b.server_id);
    }

    #[test]
    fn ordering_agrees_with_equality(a in position_strategy(), b in position_strategy()) {
        let equal_by_order = a.partial_cmp(&b) == Some(Ordering::Equal);
        prop_assert_eq!(equal_by_order, a == b);
    }

    #[test]
    fn ordering_is_transitive(
        a in position_strategy(),
        b in position_strategy(),
        c in position_strategy(),
    ) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    #[test]
    fn larger_offset_in_same_segment_is_greater(
        base in position_strategy(),
        delta in 1_u64 .. 1_000,
    ) {
        let later = Position::new(base.server_id, base.name.clone(), base.offset + delta);
        prop_assert!(later > base);
    }
}
