//! Peerwatch state - the mutable view one node keeps of its cluster.
//!
//! A `ClusterView` is owned by exactly one node and mutated concurrently by
//! that node's router and failure monitor. Every mutation is a single atomic
//! method; external code never reaches into the internal maps.

pub mod cluster_view;

pub use cluster_view::*;
