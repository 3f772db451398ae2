//! Peerwatch protocol - core types and message definitions
//!
//! Defines the typed message variants exchanged over the cluster bus and the
//! role/tier vocabulary of the three-tier leadership hierarchy
//! (Boss, Deputy1, Deputy2 over a Follower pool).

pub mod error;
pub mod messages;
pub mod types;

pub use error::*;
pub use messages::*;
pub use types::*;
