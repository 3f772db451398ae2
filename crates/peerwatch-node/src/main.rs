//! Demo binary: runs a small cluster on an in-process bus, lets it elect a
//! hierarchy, then kills the Boss to show the promotion cascade and the
//! Deputy2 refill at work.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use peerwatch_bus::ClusterBus;
use peerwatch_election::RandomLoad;
use peerwatch_node::{Node, NodeConfig};
use peerwatch_protocol::{Pid, Role};

#[derive(Parser, Debug)]
#[command(name = "peerwatch")]
#[command(version)]
#[command(about = "Decentralized failure detection and tiered leader election")]
struct Args {
    /// Number of nodes to start.
    #[arg(long, default_value_t = 4)]
    nodes: usize,

    /// Seconds to wait before killing the elected Boss.
    #[arg(long, default_value_t = 30)]
    kill_boss_after: u64,

    /// Seconds to keep the survivors running after the kill, so the cascade
    /// and the refill election can be observed settling.
    #[arg(long, default_value_t = 60)]
    settle_for: u64,

    /// Heartbeat emission period, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    heartbeat_interval_ms: u64,

    /// Failure-detection scan period, in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    detect_interval_ms: u64,

    /// Silence threshold before a peer is declared dead, in milliseconds.
    #[arg(long, default_value_t = 20_000)]
    heartbeat_timeout_ms: u64,
}

impl Args {
    fn node_config(&self) -> NodeConfig {
        NodeConfig {
            heartbeat_interval: Duration::from_millis(self.heartbeat_interval_ms),
            detect_interval: Duration::from_millis(self.detect_interval_ms),
            heartbeat_timeout: Duration::from_millis(self.heartbeat_timeout_ms),
            ..NodeConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.nodes >= 2, "need at least 2 nodes for a meaningful demo");

    let bus = ClusterBus::default();
    let shutdown = CancellationToken::new();
    let mut nodes: Vec<Node> = sample_pids(args.nodes)
        .into_iter()
        .map(|pid| {
            Node::spawn(
                pid,
                bus.clone(),
                args.node_config(),
                Box::new(RandomLoad),
                &shutdown,
            )
        })
        .collect();

    tracing::info!(nodes = nodes.len(), "cluster running, waiting for the first election");
    sleep_or_ctrl_c(&shutdown, Duration::from_secs(args.kill_boss_after)).await;

    if !shutdown.is_cancelled() {
        let boss_at = nodes
            .iter()
            .position(|n| n.role() == Role::Boss)
            .context("no node reached the Boss role; try a longer --kill-boss-after")?;
        let boss = nodes.swap_remove(boss_at);
        tracing::info!(pid = %boss.pid(), "killing the Boss");
        boss.kill();

        sleep_or_ctrl_c(&shutdown, Duration::from_secs(args.settle_for)).await;
    }

    for node in &nodes {
        let roster: Vec<String> = node
            .view()
            .roster_snapshot()
            .iter()
            .map(|e| format!("{}:{}", e.pid, e.label()))
            .collect();
        tracing::info!(pid = %node.pid(), role = node.role().as_str(), roster = ?roster, "final state");
    }

    shutdown.cancel();
    for node in nodes {
        node.shutdown().await;
    }
    Ok(())
}

/// Unique random pids in the 100..1000 range.
fn sample_pids(count: usize) -> Vec<Pid> {
    let mut rng = rand::thread_rng();
    let mut seen = HashSet::new();
    while seen.len() < count {
        seen.insert(Pid(rng.gen_range(100..1000)));
    }
    seen.into_iter().collect()
}

async fn sleep_or_ctrl_c(shutdown: &CancellationToken, period: Duration) {
    tokio::select! {
        _ = tokio::time::sleep(period) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
            shutdown.cancel();
        }
    }
}
