//! Integration test: node membership changes.
//!
//! Grow, shrink and churn a ring through the public API and check the
//! structural invariants after every step.

use hashring::{Ring, RingError};
use hashring_integration_tests::{assert_ring_invariants, node_keys, ring_with};

/// create(3); add A, B; route; remove A; route again.
#[test]
fn test_two_node_walkthrough() {
    let mut ring = ring_with(3, &["A", "B"]);
    assert_eq!(ring.item_count(), 6);
    assert_eq!(ring.node_count(), 2);
    assert_ring_invariants(&ring);

    let owner = ring.route("hello").unwrap().to_vec();
    assert!(owner == b"A" || owner == b"B", "unexpected owner {owner:?}");
    for _ in 0..10 {
        assert_eq!(ring.route("hello").unwrap(), owner.as_slice());
    }

    ring.remove_node("A").unwrap();
    assert_eq!(ring.item_count(), 3);
    assert_ring_invariants(&ring);
    let b = ring.find_node("B").unwrap().id();
    assert!(ring.items().iter().all(|item| item.node() == b));
    assert_eq!(ring.route("hello").unwrap(), b"B");
}

/// Grow to 32 nodes then drain back to zero.
#[test]
fn test_grow_and_drain() {
    let keys = node_keys(32);
    let mut ring = Ring::new(40).unwrap();

    for (i, key) in keys.iter().enumerate() {
        ring.add_node(key).unwrap();
        assert_eq!(ring.node_count(), i + 1);
        assert_ring_invariants(&ring);
    }

    for (i, key) in keys.iter().enumerate().rev() {
        ring.remove_node(key).unwrap();
        assert_eq!(ring.node_count(), i);
        assert_ring_invariants(&ring);
    }

    assert!(ring.is_empty());
    assert_eq!(ring.item_count(), 0);
    assert!(matches!(ring.route("anything"), Err(RingError::NotFound(_))));
}

/// Interleaved removals and re-adds, including keys removed and restored
/// many times.
#[test]
fn test_churn_keeps_invariants() {
    let keys = node_keys(12);
    let mut ring = Ring::new(25).unwrap();
    for key in &keys {
        ring.add_node(key).unwrap();
    }

    for round in 0..20 {
        let victim = &keys[(round * 7) % keys.len()];
        ring.remove_node(victim).unwrap();
        assert_ring_invariants(&ring);
        assert!(ring.find_node(victim).is_none());

        ring.add_node(victim).unwrap();
        assert_ring_invariants(&ring);
        assert_eq!(ring.node_count(), keys.len());
    }
}

/// Rejected operations leave the ring byte-for-byte identical.
#[test]
fn test_rejected_operations_do_not_mutate() {
    let mut ring = ring_with(16, &["a", "b", "c"]);
    let before = ring.dump();

    assert!(matches!(ring.add_node("b"), Err(RingError::DuplicateKey(_))));
    assert!(matches!(ring.add_node(""), Err(RingError::InvalidArgument(_))));
    assert!(matches!(ring.remove_node("zzz"), Err(RingError::NotFound(_))));
    assert!(matches!(ring.remove_node(""), Err(RingError::InvalidArgument(_))));

    assert_eq!(ring.dump(), before);
    assert_ring_invariants(&ring);
}

/// Removing a node twice fails the second time.
#[test]
fn test_double_remove() {
    let mut ring = ring_with(8, &["a", "b"]);
    ring.remove_node("a").unwrap();
    assert!(matches!(ring.remove_node("a"), Err(RingError::NotFound(_))));
    assert_eq!(ring.node_count(), 1);
    assert_ring_invariants(&ring);
}

/// Binary keys are compared by exact bytes.
#[test]
fn test_binary_node_keys() {
    let mut ring = Ring::new(8).unwrap();
    ring.add_node([0u8, 1, 2]).unwrap();
    ring.add_node([0u8, 1, 2, 0]).unwrap();
    ring.add_node([0xffu8]).unwrap();
    assert_eq!(ring.node_count(), 3);
    assert!(matches!(
        ring.add_node([0u8, 1, 2]),
        Err(RingError::DuplicateKey(_))
    ));
    assert_ring_invariants(&ring);
}

/// The dump reflects the registry and the sorted table.
#[test]
fn test_dump_after_changes() {
    let mut ring = ring_with(4, &["a", "b", "c"]);
    ring.remove_node("b").unwrap();

    let dump = ring.dump();
    assert_eq!(dump.replicas, 4);
    assert_eq!(dump.nodes, vec![b"c".to_vec(), b"a".to_vec()]);
    assert_eq!(dump.positions.len(), 8);
    assert!(dump.positions.iter().all(|(_, key)| key != b"b"));
    assert!(dump.positions.windows(2).all(|w| w[0].0 <= w[1].0));
}
