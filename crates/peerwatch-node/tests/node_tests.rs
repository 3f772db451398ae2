//! Whole-node tests: real tasks, real timers, one shared in-process bus.
//! Intervals are shrunk a few hundredfold; the waits leave generous slack so
//! scheduler jitter cannot flip the outcomes.

use std::collections::HashSet;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use peerwatch_bus::ClusterBus;
use peerwatch_election::FixedLoad;
use peerwatch_node::{Node, NodeConfig};
use peerwatch_protocol::{Pid, Role};

fn fast_config() -> NodeConfig {
    NodeConfig {
        heartbeat_interval: Duration::from_millis(20),
        detect_interval: Duration::from_millis(80),
        heartbeat_timeout: Duration::from_millis(400),
        ..NodeConfig::default()
    }
}

/// Spawn nodes with fixed, well-separated loads so the election outcome is
/// the same on every run: lower load means a higher score.
fn spawn_cluster(bus: &ClusterBus, shutdown: &CancellationToken, loads: &[(u32, f64)]) -> Vec<Node> {
    loads
        .iter()
        .map(|(pid, load)| {
            Node::spawn(
                Pid(*pid),
                bus.clone(),
                fast_config(),
                Box::new(FixedLoad(*load)),
                shutdown,
            )
        })
        .collect()
}

async fn shutdown_all(shutdown: CancellationToken, nodes: Vec<Node>) {
    shutdown.cancel();
    for node in nodes {
        node.shutdown().await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bootstrap_elects_one_full_hierarchy() {
    let bus = ClusterBus::default();
    let shutdown = CancellationToken::new();
    let nodes = spawn_cluster(
        &bus,
        &shutdown,
        &[(101, 0.0), (102, 3.0), (103, 6.0), (104, 9.0)],
    );

    // First scan at ~80ms triggers the election; give it time to settle.
    tokio::time::sleep(Duration::from_millis(600)).await;

    let roles: Vec<Role> = nodes.iter().map(Node::role).collect();
    assert_eq!(roles, vec![Role::Boss, Role::Deputy1, Role::Deputy2, Role::Follower]);

    // Every node committed the same roster.
    let mut rosters: Vec<Vec<(Pid, _)>> = nodes
        .iter()
        .map(|n| {
            let mut entries: Vec<_> = n
                .view()
                .roster_snapshot()
                .into_iter()
                .map(|e| (e.pid, e.tier))
                .collect();
            entries.sort_by_key(|(pid, _)| *pid);
            entries
        })
        .collect();
    rosters.dedup();
    assert_eq!(rosters.len(), 1, "nodes disagree on the roster: {rosters:?}");
    assert_eq!(rosters[0].len(), 3);

    shutdown_all(shutdown, nodes).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_boss_death_cascades_and_refills_deputy2() {
    let bus = ClusterBus::default();
    let shutdown = CancellationToken::new();
    let mut nodes = spawn_cluster(
        &bus,
        &shutdown,
        &[(201, 0.0), (202, 3.0), (203, 6.0), (204, 9.0)],
    );

    tokio::time::sleep(Duration::from_millis(600)).await;
    let boss_at = nodes
        .iter()
        .position(|n| n.role() == Role::Boss)
        .unwrap_or_else(|| panic!("no Boss elected"));
    let boss = nodes.swap_remove(boss_at);
    let boss_pid = boss.pid();
    assert_eq!(boss_pid, Pid(201));
    boss.kill();

    // Timeout (400ms) plus a couple of scan periods plus the refill round.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let roles: HashSet<(Pid, Role)> = nodes.iter().map(|n| (n.pid(), n.role())).collect();
    assert!(roles.contains(&(Pid(202), Role::Boss)), "roles: {roles:?}");
    assert!(roles.contains(&(Pid(203), Role::Deputy1)), "roles: {roles:?}");
    assert!(roles.contains(&(Pid(204), Role::Deputy2)), "roles: {roles:?}");

    // Survivors agree the old Boss is dead and gone from the roster.
    for node in &nodes {
        assert!(node.view().is_dead(boss_pid));
        assert!(!node.view().roster_contains(boss_pid));
    }

    shutdown_all(shutdown, nodes).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_clean_shutdown_stops_all_tasks() {
    let bus = ClusterBus::default();
    let shutdown = CancellationToken::new();
    let nodes = spawn_cluster(&bus, &shutdown, &[(301, 1.0), (302, 8.0)]);

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.cancel();
    // shutdown() joins the tasks; completing without hanging is the test.
    for node in nodes {
        tokio::time::timeout(Duration::from_secs(2), node.shutdown())
            .await
            .unwrap_or_else(|_| panic!("node tasks did not stop"));
    }
}
