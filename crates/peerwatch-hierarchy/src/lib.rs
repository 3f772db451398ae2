//! Peerwatch hierarchy - the promotion cascade.
//!
//! When a tiered leader is confirmed dead, every node applies the same local
//! rule table to its own role and decides which follow-up messages to emit.
//! No coordination happens here; convergence comes from every node seeing
//! the same deaths and applying the same rules.

pub mod cascade;

pub use cascade::*;
