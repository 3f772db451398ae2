use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::engine::ProtocolEngine;

/// Run the failure-detection scan on a fixed period until shutdown.
pub async fn run_monitor(
    engine: Arc<ProtocolEngine>,
    period: Duration,
    shutdown: CancellationToken,
) {
    let pid = engine.view().pid();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately; skip it so the
    // first scan happens one full period after startup.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => engine.run_scan(Instant::now()),
        }
    }
    tracing::debug!(%pid, "monitor stopped");
}
