//! TOML configuration for the `hashring` tool.
//!
//! Without a config file every section takes its defaults: an empty ring
//! with [`DEFAULT_REPLICAS`] positions per node, logging at `warn`.

use std::path::Path;

use anyhow::Context;
use hashring::{DEFAULT_REPLICAS, RingConfig};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring shape and initial membership.
    pub ring: RingSection,
    /// Probe key generation for `diff` and `distribution`.
    pub probe: ProbeSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Positions per node. Defaults to [`DEFAULT_REPLICAS`].
    pub replicas: Option<u32>,
    /// Node keys to register, in order.
    pub nodes: Vec<String>,
}

/// `[probe]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProbeSection {
    /// Number of generated probe keys. Defaults to 10 000.
    pub samples: Option<usize>,
    /// Prefix of generated probe keys (`"<prefix><n>"`). Defaults to `"key-"`.
    pub prefix: Option<String>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)
                    .with_context(|| format!("failed to parse {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Effective replica count.
    pub fn replicas(&self) -> u32 {
        self.ring.replicas.unwrap_or(DEFAULT_REPLICAS)
    }

    /// Effective probe sample count.
    pub fn probe_samples(&self) -> usize {
        self.probe.samples.unwrap_or(10_000)
    }

    /// Effective probe key prefix.
    pub fn probe_prefix(&self) -> &str {
        self.probe.prefix.as_deref().unwrap_or("key-")
    }

    /// Apply command-line overrides and produce the ring description.
    ///
    /// `replicas` replaces the configured count; `extra_nodes` are appended
    /// after the configured nodes.
    pub fn ring_config(&self, replicas: Option<u32>, extra_nodes: &[String]) -> RingConfig {
        let mut nodes = self.ring.nodes.clone();
        nodes.extend(extra_nodes.iter().cloned());
        RingConfig {
            replicas: replicas.unwrap_or_else(|| self.replicas()),
            nodes,
        }
    }

    /// Generated probe keys.
    pub fn probe_keys(&self, samples: Option<usize>) -> Vec<String> {
        let prefix = self.probe_prefix();
        (0..samples.unwrap_or_else(|| self.probe_samples()))
            .map(|i| format!("{prefix}{i}"))
            .collect()
    }
}
