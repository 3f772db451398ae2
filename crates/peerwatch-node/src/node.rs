use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use peerwatch_bus::ClusterBus;
use peerwatch_election::LoadSampler;
use peerwatch_protocol::{Pid, Role, Topic};
use peerwatch_state::ClusterView;

use crate::config::NodeConfig;
use crate::emitter::run_heartbeat_emitter;
use crate::engine::ProtocolEngine;
use crate::monitor::run_monitor;
use crate::router::run_router;

/// Handle to one running node: its view plus the three spawned activities
/// (heartbeat emitter, message router, failure monitor).
pub struct Node {
    pid: Pid,
    view: Arc<ClusterView>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Node {
    /// Wire a fresh node onto `bus` and start its three activities. The
    /// node's token is a child of `shutdown`, so cancelling the parent stops
    /// every node while each node can still be stopped individually.
    pub fn spawn(
        pid: Pid,
        bus: ClusterBus,
        cfg: NodeConfig,
        load: Box<dyn LoadSampler>,
        shutdown: &CancellationToken,
    ) -> Node {
        let view = Arc::new(ClusterView::new(pid, Instant::now()));
        let engine = Arc::new(ProtocolEngine::new(
            Arc::clone(&view),
            bus.clone(),
            load,
            cfg.clone(),
        ));
        let sub = bus.subscribe(&Topic::ALL);
        let token = shutdown.child_token();

        let tasks = vec![
            tokio::spawn(run_heartbeat_emitter(
                pid,
                bus,
                cfg.heartbeat_interval,
                token.clone(),
            )),
            tokio::spawn(run_router(Arc::clone(&engine), sub, token.clone())),
            tokio::spawn(run_monitor(engine, cfg.detect_interval, token.clone())),
        ];
        tracing::info!(%pid, "node started");

        Node {
            pid,
            view,
            shutdown: token,
            tasks,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn role(&self) -> Role {
        self.view.local_role()
    }

    pub fn view(&self) -> &Arc<ClusterView> {
        &self.view
    }

    /// Stop all three activities and wait for them to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
        tracing::info!(pid = %self.pid, "node stopped");
    }

    /// Stop without ceremony: tasks are aborted, so the node simply goes
    /// silent the way a crashed process would. Peers find out through the
    /// heartbeat timeout.
    pub fn kill(self) {
        self.shutdown.cancel();
        for task in &self.tasks {
            task.abort();
        }
        tracing::info!(pid = %self.pid, "node killed");
    }
}
