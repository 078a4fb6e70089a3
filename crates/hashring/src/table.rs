//! The position table: every replica's place on the ring, sorted by hash.

use std::cmp::Ordering;

use tracing::trace;

use crate::digest::DigestFn;
use crate::error::Result;
use crate::node::{Node, NodeId};

/// One replica of a node, placed on the ring.
///
/// The node is referenced by id. An item never outlives its node: the ring
/// removes all of a node's items in the same call that unregisters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    hash: u64,
    node: NodeId,
}

impl Item {
    /// Position on the ring.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The node this replica belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Orders items by ring position. Equal positions compare equal, so the
/// relative order of colliding replicas is whatever the sort leaves.
fn by_position(a: &Item, b: &Item) -> Ordering {
    a.hash.cmp(&b.hash)
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PositionTable {
    items: Vec<Item>,
}

impl PositionTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Place `replicas` items for `node` and re-sort.
    ///
    /// Replica `i` sits at `digest(node.key ++ decimal(i))`. All hashes are
    /// computed and capacity is reserved before the table is touched, so on
    /// error the table is unchanged.
    pub(crate) fn add_replicas(
        &mut self,
        node: &Node,
        replicas: u32,
        digest: DigestFn,
    ) -> Result<()> {
        let mut fresh = Vec::new();
        fresh.try_reserve_exact(replicas as usize)?;
        for i in 0..replicas {
            let index = i.to_string();
            let hash = digest(&[node.key(), index.as_bytes()])?.placement();
            trace!(node = %node, replica = i, hash, "placed replica");
            fresh.push(Item {
                hash,
                node: node.id(),
            });
        }

        self.items.try_reserve(fresh.len())?;
        self.items.append(&mut fresh);
        self.items.sort_unstable_by(by_position);
        Ok(())
    }

    /// Drop every item owned by `node`. Returns how many were removed.
    ///
    /// Removal keeps the survivors in their relative order, so the table stays
    /// sorted.
    pub(crate) fn remove_replicas(&mut self, node: NodeId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.node != node);
        before - self.items.len()
    }

    /// The node owning the first position strictly after `hash`, wrapping to
    /// the lowest position when `hash` is at or past the last one.
    ///
    /// Returns `None` only when the table is empty.
    pub(crate) fn find_owner(&self, hash: u64) -> Option<NodeId> {
        let first = self.items.first()?;

        // Narrow [min, max) to the first index whose hash exceeds the probe.
        let mut min = 0;
        let mut max = self.items.len();
        while min < max {
            let mid = min + (max - min) / 2;
            if self.items[mid].hash > hash {
                max = mid;
            } else {
                min = mid + 1;
            }
        }

        match self.items.get(min) {
            Some(item) => Some(item.node),
            None => Some(first.node),
        }
    }

    pub(crate) fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn is_sorted(&self) -> bool {
        self.items.windows(2).all(|w| w[0].hash <= w[1].hash)
    }
}
