//! Integration test: routing.
//!
//! Lookup semantics: next-highest position, wrap-around, determinism and the
//! empty ring.

use hashring::{Ring, RingError, key_placement, replica_placement};
use hashring_integration_tests::{owners, probe_keys, ring_with};

/// Two rings built independently, in different orders, route identically.
#[test]
fn test_independent_rings_agree() {
    let a = ring_with(80, &["x", "y", "z", "w"]);
    let b = ring_with(80, &["w", "z", "y", "x"]);
    let keys = probe_keys(2_000, 1);
    assert_eq!(owners(&a, &keys), owners(&b, &keys));
}

/// Routing twice without mutation yields the same node.
#[test]
fn test_route_repeatable() {
    let ring = ring_with(20, &["a", "b", "c"]);
    for key in probe_keys(500, 2) {
        let first = ring.route(&key).unwrap();
        let second = ring.route(&key).unwrap();
        assert_eq!(first, second);
    }
}

/// A key routes to the owner of the first position above its placement.
#[test]
fn test_route_is_next_highest_position() {
    let ring = ring_with(10, &["a", "b", "c"]);
    let items = ring.items();

    for key in probe_keys(300, 4) {
        let hash = key_placement(&key);
        let expected = items
            .iter()
            .find(|item| item.hash() > hash)
            .unwrap_or(&items[0])
            .node();
        assert_eq!(ring.route_node(&key).unwrap().id(), expected);
    }
}

/// Positions past the last item wrap to the lowest item's node.
#[test]
fn test_wrap_around() {
    let ring = ring_with(10, &["a", "b", "c"]);
    let items = ring.items();
    let lowest = items[0].node();
    let highest = items[items.len() - 1].hash();

    assert_eq!(ring.owner_of(highest).unwrap().id(), lowest);
    assert_eq!(ring.owner_of(u64::MAX).unwrap().id(), lowest);
}

/// Replica positions are exactly the documented placements.
#[test]
fn test_replica_positions_are_documented_placements() {
    let ring = ring_with(5, &["cache-a"]);
    let mut expected: Vec<u64> = (0..5).map(|i| replica_placement(b"cache-a", i)).collect();
    expected.sort_unstable();
    let actual: Vec<u64> = ring.items().iter().map(|item| item.hash()).collect();
    assert_eq!(actual, expected);
}

/// A one-node ring owns everything.
#[test]
fn test_single_node_owns_all() {
    let ring = ring_with(1, &["solo"]);
    for key in probe_keys(200, 9) {
        assert_eq!(ring.route(&key).unwrap(), b"solo");
    }
}

/// Routing on an empty ring fails with NotFound, routing an empty key with
/// InvalidArgument.
#[test]
fn test_route_errors() {
    let empty = Ring::new(3).unwrap();
    assert!(matches!(empty.route("k"), Err(RingError::NotFound(_))));
    assert!(empty.owner_of(0).is_none());

    let ring = ring_with(3, &["a"]);
    assert!(matches!(ring.route(""), Err(RingError::InvalidArgument(_))));
}
