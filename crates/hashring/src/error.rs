//! Error types for ring operations.

use std::collections::TryReserveError;

/// Errors that can occur while mutating or querying a [`Ring`](crate::Ring).
///
/// Every mutating operation is all-or-nothing: when one of these is returned
/// the ring is in exactly the state it was in before the call.
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    /// A zero replica count, or an empty node or routing key.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A node with this exact key is already registered.
    #[error("duplicate node key: {}", String::from_utf8_lossy(.0))]
    DuplicateKey(Vec<u8>),

    /// No node matched the key, or the ring has no nodes to route to.
    #[error("not found: {0}")]
    NotFound(String),

    /// Allocating the key copy or the position table failed.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(#[from] TryReserveError),

    /// The digest function failed. Not retried.
    #[error("digest computation failed: {0}")]
    HashFailure(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = RingError> = std::result::Result<T, E>;
