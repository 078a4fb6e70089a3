//! Node identities and the registry that owns them.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, RingError};

/// Stable handle to a registered node.
///
/// Assigned by the registry from a counter that only moves forward, so an id
/// is never reused within one ring, even after its node is removed. Position
/// table items refer to their node through this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// The raw counter value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A ring participant, identified by an opaque byte-string key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    key: Box<[u8]>,
}

impl Node {
    /// Registry handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The key the node was registered with.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The key as text, with invalid UTF-8 replaced.
    pub fn key_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_lossy())
    }
}

/// The set of live nodes.
///
/// Lookup by key is a linear scan; it only runs on add and remove, never on
/// the routing path, which resolves ids instead.
#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Copy `key` into a new node and register it.
    pub(crate) fn insert(&mut self, key: &[u8]) -> Result<&Node> {
        if key.is_empty() {
            return Err(RingError::InvalidArgument("node key must not be empty"));
        }
        if self.find(key).is_some() {
            return Err(RingError::DuplicateKey(key.to_vec()));
        }

        let mut owned = Vec::new();
        owned.try_reserve_exact(key.len())?;
        owned.extend_from_slice(key);

        let id = NodeId(self.next_id);
        self.next_id += 1;

        let node = Node {
            id,
            key: owned.into_boxed_slice(),
        };
        let node: &Node = self.nodes.entry(id).or_insert(node);
        Ok(node)
    }

    /// Unregister the node with this exact key and hand it back.
    pub(crate) fn remove(&mut self, key: &[u8]) -> Result<Node> {
        if key.is_empty() {
            return Err(RingError::InvalidArgument("node key must not be empty"));
        }
        let id = self
            .find(key)
            .map(Node::id)
            .ok_or_else(|| RingError::NotFound(format!("node {}", String::from_utf8_lossy(key))))?;
        self.remove_id(id)
            .ok_or_else(|| RingError::NotFound(format!("node {id}")))
    }

    pub(crate) fn remove_id(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    pub(crate) fn find(&self, key: &[u8]) -> Option<&Node> {
        self.nodes.values().find(|node| *node.key == *key)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Live nodes, most recently added first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().rev()
    }
}
