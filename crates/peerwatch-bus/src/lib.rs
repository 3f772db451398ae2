//! Peerwatch bus - the publish/subscribe transport between nodes.
//!
//! The protocol core only requires fire-and-forget `publish` and an
//! at-least-once, unordered, possibly-duplicated subscription stream.
//! This crate provides an in-process implementation over
//! `tokio::sync::broadcast`; every handler upstream is written to tolerate
//! the weaker contract, so a real network transport can replace this one
//! without touching the protocol engine.

pub mod bus;

pub use bus::*;
