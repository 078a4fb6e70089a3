//! Consistent hashing ring for routing keys to a dynamic set of nodes.
//!
//! Each registered node is expanded into a fixed number of replicas (virtual
//! nodes) placed on a u64 ring at `sha1(node_key ++ decimal(replica_index))`.
//! A key routes to the node owning the first replica position strictly after
//! `sha1(key)`, wrapping around past the highest position. Adding or removing
//! a node only moves the keys that land on that node's replicas.
//!
//! This crate provides:
//! - [`Ring`]: node registration, removal, routing and diagnostics.
//! - [`RingConfig`]: a serde-deserializable ring description.
//! - [`Digest160`], [`key_placement`], [`replica_placement`]: the hashing used
//!   to place keys and replicas.
//!
//! The ring is not synchronized. Callers sharing one across threads must wrap
//! it in a lock.

mod config;
mod digest;
mod error;
mod node;
mod ring;
mod table;

pub use config::{DEFAULT_REPLICAS, RingConfig};
pub use digest::{Digest160, key_placement, replica_placement};
pub use error::{Result, RingError};
pub use node::{Node, NodeId};
pub use ring::{Migration, Ring, RingDump};
pub use table::Item;
