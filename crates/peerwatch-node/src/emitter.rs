use std::time::Duration;

use tokio_util::sync::CancellationToken;

use peerwatch_bus::ClusterBus;
use peerwatch_protocol::Pid;

/// Broadcast this node's heartbeat on a fixed period until shutdown.
pub async fn run_heartbeat_emitter(
    pid: Pid,
    bus: ClusterBus,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                match peerwatch_protocol::ProtocolMessage::heartbeat(pid).encode() {
                    Ok(payload) => bus.publish(peerwatch_protocol::Topic::Heartbeat, payload),
                    Err(e) => tracing::error!(%pid, error = %e, "failed to encode heartbeat"),
                }
            }
        }
    }
    tracing::debug!(%pid, "heartbeat emitter stopped");
}
