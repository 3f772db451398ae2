use std::time::Duration;

use peerwatch_bus::DEFAULT_BUS_CAPACITY;

/// Timing knobs for one node's three activities.
///
/// The defaults match the protocol's nominal cadence: a heartbeat every
/// second, a failure scan every five, and a peer declared dead once its
/// silence strictly exceeds twenty seconds. Tests shrink all three to keep
/// runtimes low; the ratios are what matter, not the absolute values.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Period of the self-heartbeat broadcast.
    pub heartbeat_interval: Duration,
    /// Period of the failure-detection scan.
    pub detect_interval: Duration,
    /// Silence threshold past which a peer is declared dead. The comparison
    /// is strict: silence of exactly this long is still alive.
    pub heartbeat_timeout: Duration,
    /// Capacity of the shared bus channel, when this node creates the bus.
    pub bus_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(1),
            detect_interval: Duration::from_secs(5),
            heartbeat_timeout: Duration::from_secs(20),
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cadence() {
        let cfg = NodeConfig::default();
        assert_eq!(cfg.heartbeat_interval, Duration::from_secs(1));
        assert_eq!(cfg.detect_interval, Duration::from_secs(5));
        assert_eq!(cfg.heartbeat_timeout, Duration::from_secs(20));
    }
}
