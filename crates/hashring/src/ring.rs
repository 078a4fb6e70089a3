//! Consistent hashing ring implementation.

use std::fmt;

use tracing::debug;

use crate::config::RingConfig;
use crate::digest::{DigestFn, sha1_digest};
use crate::error::{Result, RingError};
use crate::node::{Node, NodeId, Registry};
use crate::table::{Item, PositionTable};

/// A key whose owner differs between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The probe key.
    pub key: Vec<u8>,
    /// Owner before the change, `None` if the old ring was empty.
    pub from: Option<Vec<u8>>,
    /// Owner after the change, `None` if the new ring is empty.
    pub to: Option<Vec<u8>>,
}

/// Consistent hashing ring mapping keys to nodes.
///
/// Each node occupies `replicas` positions on a u64 ring. A key is owned by
/// the node at the first position strictly after the key's own position,
/// wrapping around past the highest one.
///
/// The ring has no internal locking. Mutation takes `&mut self`; callers that
/// share a ring between threads wrap it in their own lock.
#[derive(Debug, Clone)]
pub struct Ring {
    replicas: u32,
    nodes: Registry,
    items: PositionTable,
    digest: DigestFn,
}

impl Ring {
    /// Create an empty ring placing `replicas` positions per node.
    pub fn new(replicas: u32) -> Result<Self> {
        Self::with_digest(replicas, sha1_digest)
    }

    pub(crate) fn with_digest(replicas: u32, digest: DigestFn) -> Result<Self> {
        if replicas < 1 {
            return Err(RingError::InvalidArgument("replica count must be at least 1"));
        }
        Ok(Self {
            replicas,
            nodes: Registry::new(),
            items: PositionTable::new(),
            digest,
        })
    }

    /// Build a ring from a config, adding its nodes in order.
    pub fn from_config(config: &RingConfig) -> Result<Self> {
        let mut ring = Self::new(config.replicas)?;
        for key in &config.nodes {
            ring.add_node(key)?;
        }
        Ok(ring)
    }

    /// Register a node and place its replicas.
    ///
    /// Fails with [`RingError::InvalidArgument`] for an empty key and
    /// [`RingError::DuplicateKey`] if the key is already present. On any
    /// error the ring is left as it was.
    pub fn add_node(&mut self, key: impl AsRef<[u8]>) -> Result<NodeId> {
        let node = self.nodes.insert(key.as_ref())?;
        let id = node.id();

        if let Err(e) = self.items.add_replicas(node, self.replicas, self.digest) {
            self.nodes.remove_id(id);
            return Err(e);
        }

        debug!(
            node = %String::from_utf8_lossy(key.as_ref()),
            %id,
            replicas = self.replicas,
            positions = self.items.len(),
            "added node to ring"
        );
        Ok(id)
    }

    /// Unregister a node and drop all of its positions.
    pub fn remove_node(&mut self, key: impl AsRef<[u8]>) -> Result<()> {
        let node = self.nodes.remove(key.as_ref())?;
        let removed = self.items.remove_replicas(node.id());
        debug!(
            node = %node,
            id = %node.id(),
            removed,
            positions = self.items.len(),
            "removed node from ring"
        );
        Ok(())
    }

    /// Key of the node that owns `key`.
    pub fn route(&self, key: impl AsRef<[u8]>) -> Result<&[u8]> {
        self.route_node(key).map(Node::key)
    }

    /// The node that owns `key`.
    ///
    /// Fails with [`RingError::NotFound`] when the ring has no nodes.
    pub fn route_node(&self, key: impl AsRef<[u8]>) -> Result<&Node> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(RingError::InvalidArgument("routing key must not be empty"));
        }
        if self.items.is_empty() {
            return Err(RingError::NotFound("owner: ring has no nodes".to_string()));
        }

        let hash = (self.digest)(&[key])?.placement();
        self.owner_of(hash).ok_or_else(|| {
            RingError::NotFound(format!("owner of position {hash:#018x}"))
        })
    }

    /// The node owning the first position strictly after `hash`, wrapping to
    /// the lowest position. `None` on an empty ring.
    pub fn owner_of(&self, hash: u64) -> Option<&Node> {
        self.items
            .find_owner(hash)
            .and_then(|id| self.nodes.get(id))
    }

    /// Look up a registered node by its exact key.
    pub fn find_node(&self, key: impl AsRef<[u8]>) -> Option<&Node> {
        self.nodes.find(key.as_ref())
    }

    /// Resolve a node id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Live nodes, most recently added first.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All positions, sorted ascending by hash.
    pub fn items(&self) -> &[Item] {
        self.items.as_slice()
    }

    /// Positions per node.
    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of positions on the ring.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// True if no node is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// True if positions are in ascending hash order.
    pub fn is_sorted(&self) -> bool {
        self.items.is_sorted()
    }

    /// Snapshot of the ring for debugging. The rendered layout is not stable.
    pub fn dump(&self) -> RingDump {
        RingDump {
            replicas: self.replicas,
            nodes: self.nodes.iter().map(|n| n.key().to_vec()).collect(),
            positions: self
                .items
                .as_slice()
                .iter()
                .filter_map(|item| {
                    self.nodes
                        .get(item.node())
                        .map(|n| (item.hash(), n.key().to_vec()))
                })
                .collect(),
        }
    }

    /// Keys from `keys` whose owner differs between `old` and `new`.
    pub fn diff<K: AsRef<[u8]>>(old: &Ring, new: &Ring, keys: &[K]) -> Vec<Migration> {
        let mut migrations = Vec::new();

        for key in keys {
            let key = key.as_ref();
            let from = old.route(key).ok();
            let to = new.route(key).ok();
            if from != to {
                migrations.push(Migration {
                    key: key.to_vec(),
                    from: from.map(<[u8]>::to_vec),
                    to: to.map(<[u8]>::to_vec),
                });
            }
        }

        migrations
    }
}

/// Diagnostic snapshot returned by [`Ring::dump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingDump {
    /// Positions per node.
    pub replicas: u32,
    /// Node keys, most recently added first.
    pub nodes: Vec<Vec<u8>>,
    /// `(hash, node key)` in ring order.
    pub positions: Vec<(u64, Vec<u8>)>,
}

impl fmt::Display for RingDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ring: {} replicas, {} nodes, {} positions",
            self.replicas,
            self.nodes.len(),
            self.positions.len()
        )?;
        writeln!(f, "nodes:")?;
        for (i, key) in self.nodes.iter().enumerate() {
            writeln!(f, "  {i}: {}", String::from_utf8_lossy(key))?;
        }
        writeln!(f, "positions:")?;
        for (hash, key) in &self.positions {
            writeln!(f, "  {hash:016x} {}", String::from_utf8_lossy(key))?;
        }
        Ok(())
    }
}
