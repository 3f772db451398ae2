use std::collections::HashSet;

use thiserror::Error;
use tokio::sync::broadcast;

use peerwatch_protocol::Topic;

/// Default capacity of the shared broadcast channel. At one heartbeat per
/// node per second plus occasional protocol traffic, this gives a slow
/// subscriber plenty of headroom before lagging.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus closed")]
    Closed,
}

/// A single published message: topic tag plus opaque payload.
///
/// The payload is the JSON encoding of a `ProtocolMessage`; decoding happens
/// once, at the receiving router, never inside the bus.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub topic: Topic,
    pub payload: String,
}

/// In-process publish/subscribe bus shared by every node of a cluster.
///
/// Cloning is cheap; all clones publish into the same channel. Publishers do
/// not wait for subscribers and get no delivery guarantee.
#[derive(Debug, Clone)]
pub struct ClusterBus {
    tx: broadcast::Sender<Envelope>,
}

impl ClusterBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a payload on a topic. Fire-and-forget: delivery failures are
    /// logged and swallowed, since the heartbeat timeout path already covers
    /// lost messages.
    pub fn publish(&self, topic: Topic, payload: String) {
        let receivers = self.tx.receiver_count();
        if let Err(e) = self.tx.send(Envelope { topic, payload }) {
            tracing::debug!(topic = %topic, receivers, error = %e, "publish dropped: no subscribers");
        }
    }

    /// Subscribe to a set of topics. Messages published before this call are
    /// not delivered.
    pub fn subscribe(&self, topics: &[Topic]) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            topics: topics.iter().copied().collect(),
        }
    }
}

impl Default for ClusterBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

/// Inbound message stream for one subscriber, filtered by topic.
pub struct Subscription {
    rx: broadcast::Receiver<Envelope>,
    topics: HashSet<Topic>,
}

impl Subscription {
    /// Receive the next message on a subscribed topic.
    ///
    /// A lagged subscriber skips the overwritten messages with a warning and
    /// keeps going; the subscription only ends (`Err(Closed)`) once every
    /// bus handle is dropped. Cancel-safe, so callers poll it inside
    /// `tokio::select!` alongside a shutdown signal.
    pub async fn recv(&mut self) -> Result<Envelope, BusError> {
        loop {
            match self.rx.recv().await {
                Ok(env) if self.topics.contains(&env.topic) => return Ok(env),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, skipping ahead");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return Err(BusError::Closed),
            }
        }
    }
}
