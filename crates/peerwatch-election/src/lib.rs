//! Peerwatch election - ballot scoring and resolution.
//!
//! Two elections exist in the protocol: the primary election that fills the
//! whole Boss/Deputy1/Deputy2 hierarchy, and the sub-election that refills
//! only the Deputy2 tier from the Follower pool. Both use the same fitness
//! score and the same deterministic tie-break (higher pid wins).
//!
//! Resolution here is pure: each node feeds in the ballots it has collected
//! in its own cluster view and commits the result locally. Nodes with the
//! same ballot set always reach the same hierarchy; nodes with diverging
//! views may briefly disagree, which the protocol accepts.

pub mod deputy2;
pub mod primary;
pub mod score;

pub use deputy2::*;
pub use primary::*;
pub use score::*;
