//! Peerwatch node runtime.
//!
//! Ties the protocol pieces together into a running node: a heartbeat
//! emitter, a message router, and a failure-detection monitor, all three as
//! cancellable tokio tasks sharing one [`peerwatch_state::ClusterView`]
//! through the [`engine::ProtocolEngine`].

pub mod config;
pub mod emitter;
pub mod engine;
pub mod monitor;
pub mod node;
pub mod router;

pub use config::NodeConfig;
pub use engine::ProtocolEngine;
pub use node::Node;
