//! Declarative ring description.

use serde::Deserialize;

/// Replica count used when none is configured.
pub const DEFAULT_REPLICAS: u32 = 160;

/// Replica count and initial membership of a ring.
///
/// Deserializes from any serde format; the CLI reads it from the `[ring]`
/// table of its TOML config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Positions each node occupies on the ring.
    pub replicas: u32,
    /// Node keys, added in this order.
    pub nodes: Vec<String>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            nodes: Vec::new(),
        }
    }
}
