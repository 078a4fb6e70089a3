//! `hashring`: inspect a consistent hashing ring from the command line.
//!
//! # Usage
//!
//! ```text
//! hashring -c ring.toml route user/42 user/43   # which node owns each key
//! hashring -n a -n b -n c dump                  # list nodes and positions
//! hashring -c ring.toml diff --remove cache-b   # keys that move on removal
//! hashring -c ring.toml distribution -s 100000  # probe keys per node
//! ```

mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hashring::Ring;
use tracing::{debug, info};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "hashring",
    version,
    about = "Consistent hashing ring inspector"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured replica count.
    #[arg(short, long, global = true)]
    replicas: Option<u32>,

    /// Node key to add after the configured nodes. Can be repeated.
    #[arg(short, long = "node", global = true)]
    nodes: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the owning node of each key.
    Route {
        /// Keys to route.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Print every node and every ring position.
    Dump,

    /// Show which probe keys change owner when one node joins or leaves.
    Diff {
        /// Node joining the ring.
        #[arg(long, conflicts_with = "remove", required_unless_present = "remove")]
        add: Option<String>,

        /// Node leaving the ring.
        #[arg(long)]
        remove: Option<String>,

        /// Number of probe keys (defaults to `[probe] samples`).
        #[arg(short, long)]
        samples: Option<usize>,

        /// Print every moved key, not just the totals.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Count probe keys per node.
    Distribution {
        /// Number of probe keys (defaults to `[probe] samples`).
        #[arg(short, long)]
        samples: Option<usize>,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    let ring_config = config.ring_config(cli.replicas, &cli.nodes);
    let ring = Ring::from_config(&ring_config).context("failed to build ring")?;
    info!(
        replicas = ring.replicas(),
        nodes = ring.node_count(),
        positions = ring.item_count(),
        "ring built"
    );

    match cli.command {
        Commands::Route { keys } => cmd_route(&ring, &keys),
        Commands::Dump => {
            print!("{}", ring.dump());
            Ok(())
        }
        Commands::Diff {
            add,
            remove,
            samples,
            verbose,
        } => cmd_diff(&ring, &config.probe_keys(samples), add, remove, verbose),
        Commands::Distribution { samples } => {
            cmd_distribution(&ring, &config.probe_keys(samples))
        }
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

fn cmd_route(ring: &Ring, keys: &[String]) -> Result<()> {
    for key in keys {
        let node = ring
            .route_node(key)
            .with_context(|| format!("failed to route {key:?}"))?;
        println!("{key} -> {node}");
    }
    Ok(())
}

fn cmd_diff(
    ring: &Ring,
    keys: &[String],
    add: Option<String>,
    remove: Option<String>,
    verbose: bool,
) -> Result<()> {
    let mut changed = ring.clone();
    let change = match (add, remove) {
        (Some(node), None) => {
            changed
                .add_node(&node)
                .with_context(|| format!("failed to add node {node:?}"))?;
            format!("add {node}")
        }
        (None, Some(node)) => {
            changed
                .remove_node(&node)
                .with_context(|| format!("failed to remove node {node:?}"))?;
            format!("remove {node}")
        }
        _ => bail!("exactly one of --add or --remove is required"),
    };
    debug!(%change, probes = keys.len(), "computing ring diff");

    let migrations = Ring::diff(ring, &changed, keys);
    let ratio = if keys.is_empty() {
        0.0
    } else {
        migrations.len() as f64 / keys.len() as f64
    };

    println!("{change}: {}/{} keys moved ({:.2}%)", migrations.len(), keys.len(), ratio * 100.0);

    let mut flows: BTreeMap<(String, String), usize> = BTreeMap::new();
    for m in &migrations {
        let from = display_owner(m.from.as_deref());
        let to = display_owner(m.to.as_deref());
        if verbose {
            println!("  {} : {from} -> {to}", String::from_utf8_lossy(&m.key));
        }
        *flows.entry((from, to)).or_default() += 1;
    }
    for ((from, to), count) in flows {
        println!("  {from} -> {to}: {count}");
    }
    Ok(())
}

fn cmd_distribution(ring: &Ring, keys: &[String]) -> Result<()> {
    if ring.is_empty() {
        bail!("ring has no nodes");
    }

    let mut counts: BTreeMap<String, usize> = ring
        .nodes()
        .map(|node| (node.to_string(), 0))
        .collect();
    for key in keys {
        let node = ring.route_node(key)?;
        *counts.entry(node.to_string()).or_default() += 1;
    }

    let expected = keys.len() as f64 / ring.node_count() as f64;
    println!(
        "{} keys over {} nodes ({} replicas each)",
        keys.len(),
        ring.node_count(),
        ring.replicas()
    );
    for (node, count) in counts {
        let skew = if expected > 0.0 {
            count as f64 / expected
        } else {
            0.0
        };
        println!("  {node}: {count} ({skew:.2}x)");
    }
    Ok(())
}

fn display_owner(owner: Option<&[u8]>) -> String {
    match owner {
        Some(key) => String::from_utf8_lossy(key).into_owned(),
        None => "(none)".to_string(),
    }
}
