use std::collections::HashMap;

use peerwatch_protocol::{Pid, Role, RosterEntry, Tier};

/// Outcome of a resolved primary election: the three tiers, in order.
/// Tiers past the candidate count stay empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyAssignment {
    pub boss: Pid,
    pub deputy1: Option<Pid>,
    pub deputy2: Option<Pid>,
}

impl HierarchyAssignment {
    /// The role this assignment gives to `pid` (Follower when unassigned).
    pub fn role_of(&self, pid: Pid) -> Role {
        if self.boss == pid {
            Role::Boss
        } else if self.deputy1 == Some(pid) {
            Role::Deputy1
        } else if self.deputy2 == Some(pid) {
            Role::Deputy2
        } else {
            Role::Follower
        }
    }

    /// The fresh roster this assignment commits, all entries alive.
    pub fn roster_entries(&self) -> Vec<RosterEntry> {
        let mut entries = vec![RosterEntry::alive(self.boss, Tier::Boss)];
        if let Some(pid) = self.deputy1 {
            entries.push(RosterEntry::alive(pid, Tier::Deputy1));
        }
        if let Some(pid) = self.deputy2 {
            entries.push(RosterEntry::alive(pid, Tier::Deputy2));
        }
        entries
    }
}

/// Rank ballots into a deterministic total order: score descending, ties
/// broken by higher pid first.
pub fn rank_ballots(ballots: &HashMap<Pid, f64>) -> Vec<(Pid, f64)> {
    let mut ranked: Vec<(Pid, f64)> = ballots.iter().map(|(p, s)| (*p, *s)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.0.cmp(&a.0))
    });
    ranked
}

/// Resolve a primary election from a ballot set.
///
/// The top candidate becomes Boss; the next two distinct candidates fill
/// Deputy1 and Deputy2. Returns None when there are no ballots at all.
/// Pure and total-ordered, so every node resolving the same ballot set
/// commits the same hierarchy.
pub fn resolve_primary(ballots: &HashMap<Pid, f64>) -> Option<HierarchyAssignment> {
    let ranked = rank_ballots(ballots);
    let mut candidates = ranked.iter().map(|(pid, _)| *pid);

    Some(HierarchyAssignment {
        boss: candidates.next()?,
        deputy1: candidates.next(),
        deputy2: candidates.next(),
    })
}
