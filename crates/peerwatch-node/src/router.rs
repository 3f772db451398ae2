use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use peerwatch_bus::{BusError, Subscription};
use peerwatch_protocol::ProtocolMessage;

use crate::engine::ProtocolEngine;

/// Drain the inbound subscription and dispatch each message to the engine.
///
/// Handlers run one at a time on this task, so no two of them ever mutate
/// the view concurrently; only the monitor races with us, and the view's
/// atomic methods cover that. Malformed payloads are dropped with a
/// diagnostic, never fatal.
pub async fn run_router(
    engine: Arc<ProtocolEngine>,
    mut sub: Subscription,
    shutdown: CancellationToken,
) {
    let pid = engine.view().pid();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = sub.recv() => match received {
                Ok(envelope) => match ProtocolMessage::decode(&envelope.payload) {
                    Ok(msg) => engine.handle_message(msg, Instant::now()),
                    Err(e) => {
                        tracing::warn!(%pid, topic = %envelope.topic, error = %e, "dropping malformed payload");
                    }
                },
                Err(BusError::Closed) => break,
            }
        }
    }
    tracing::debug!(%pid, "router stopped");
}
