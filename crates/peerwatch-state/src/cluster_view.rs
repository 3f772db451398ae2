use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Instant;

use peerwatch_protocol::{Pid, Role, RosterEntry, RosterStatus, Tier};

#[derive(Debug, Default)]
struct ViewInner {
    /// Pids observed live via heartbeats.
    alive: HashSet<Pid>,
    /// Pids permanently marked dead. Grows monotonically; a pid is never
    /// removed, which is what makes duplicate death events no-ops.
    dead: HashSet<Pid>,
    /// Last heartbeat receipt per pid; entries are removed on death.
    heartbeat_last_seen: HashMap<Pid, Instant>,
    /// Last known role per pid, from role-change broadcasts.
    role_directory: HashMap<Pid, Role>,
    /// The hierarchy roster ("boss list").
    roster: Vec<RosterEntry>,
    /// Ballots of an in-flight primary election; empty otherwise.
    election_scores: HashMap<Pid, f64>,
    /// Candidacies of an in-flight Deputy2 sub-election; empty otherwise.
    deputy2_candidates: HashMap<Pid, f64>,
    /// This node's own role.
    local_role: Role,
}

impl ViewInner {
    /// Alive pids whose directory role is Follower, the Deputy2 electorate.
    fn alive_follower_count(&self) -> usize {
        self.alive
            .iter()
            .filter(|pid| {
                self.role_directory.get(pid).copied().unwrap_or_default() == Role::Follower
            })
            .count()
    }
}

/// The state one node keeps about itself and its peers.
///
/// All methods take `&self` and lock internally, so the router and the
/// monitor can call them concurrently without ever observing a torn update;
/// in particular a roster entry's three fields always change as a unit.
#[derive(Debug)]
pub struct ClusterView {
    pid: Pid,
    started_at: Instant,
    inner: RwLock<ViewInner>,
}

impl ClusterView {
    /// Create the view for a freshly started node: empty sets, Follower role.
    pub fn new(pid: Pid, started_at: Instant) -> Self {
        Self {
            pid,
            started_at,
            inner: RwLock::new(ViewInner::default()),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Uptime in (fractional) seconds at `now`, the election fitness proxy.
    pub fn uptime_secs(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.started_at).as_secs_f64()
    }

    // ── liveness ──

    /// Record a heartbeat from `pid`. Dead pids stay dead: a heartbeat from
    /// an already-declared-dead peer is ignored, preserving the invariant
    /// that no pid is alive and dead at once.
    pub fn mark_alive(&self, pid: Pid, seen_at: Instant) {
        let mut inner = self.inner.write().unwrap();
        if inner.dead.contains(&pid) {
            return;
        }
        inner.alive.insert(pid);
        inner.heartbeat_last_seen.insert(pid, seen_at);
    }

    /// Declare `pid` dead. Returns true only the first time, which gates the
    /// death announcement and the promotion cascade.
    pub fn mark_dead(&self, pid: Pid) -> bool {
        let mut inner = self.inner.write().unwrap();
        inner.alive.remove(&pid);
        inner.dead.insert(pid)
    }

    pub fn is_dead(&self, pid: Pid) -> bool {
        self.inner.read().unwrap().dead.contains(&pid)
    }

    pub fn alive_count(&self) -> usize {
        self.inner.read().unwrap().alive.len()
    }

    /// Drop the heartbeat tracking entry for `pid`. Idempotent.
    pub fn remove_heartbeat(&self, pid: Pid) {
        self.inner.write().unwrap().heartbeat_last_seen.remove(&pid);
    }

    pub fn has_heartbeat(&self, pid: Pid) -> bool {
        self.inner
            .read()
            .unwrap()
            .heartbeat_last_seen
            .contains_key(&pid)
    }

    /// Snapshot of the heartbeat map for the monitor's timeout scan.
    pub fn heartbeat_snapshot(&self) -> Vec<(Pid, Instant)> {
        self.inner
            .read()
            .unwrap()
            .heartbeat_last_seen
            .iter()
            .map(|(pid, at)| (*pid, *at))
            .collect()
    }

    // ── roles ──

    pub fn local_role(&self) -> Role {
        self.inner.read().unwrap().local_role
    }

    /// Set this node's own role, writing through to the role directory.
    pub fn set_local_role(&self, role: Role) {
        let mut inner = self.inner.write().unwrap();
        inner.local_role = role;
        inner.role_directory.insert(self.pid, role);
    }

    pub fn set_peer_role(&self, pid: Pid, role: Role) {
        self.inner.write().unwrap().role_directory.insert(pid, role);
    }

    /// Last known role of `pid`, defaulting to Follower when unknown.
    pub fn role_of(&self, pid: Pid) -> Role {
        self.inner
            .read()
            .unwrap()
            .role_directory
            .get(&pid)
            .copied()
            .unwrap_or_default()
    }

    /// Alive pids whose directory role is Follower, the Deputy2 electorate.
    pub fn alive_follower_count(&self) -> usize {
        self.inner.read().unwrap().alive_follower_count()
    }

    // ── hierarchy roster ──

    /// Insert or update the roster entry for `pid` as `(tier, alive)`.
    /// A no-op when an identical entry already exists; the entry's fields
    /// change as a unit otherwise.
    pub fn upsert_roster_entry(&self, pid: Pid, tier: Tier) {
        let mut inner = self.inner.write().unwrap();
        match inner.roster.iter_mut().find(|e| e.pid == pid) {
            Some(entry) => {
                entry.tier = tier;
                entry.status = RosterStatus::Alive;
            }
            None => inner.roster.push(RosterEntry::alive(pid, tier)),
        }
    }

    /// Transition the roster entry for `pid` to dead, keeping it for audit.
    /// Returns the entry's tier (stable across repeated calls) so the caller
    /// can build the `Ex-` death label.
    pub fn mark_roster_dead(&self, pid: Pid) -> Option<Tier> {
        let mut inner = self.inner.write().unwrap();
        let entry = inner.roster.iter_mut().find(|e| e.pid == pid)?;
        entry.status = RosterStatus::Dead;
        Some(entry.tier)
    }

    /// Remove the entries for the given pids, after the sweep has handled
    /// their promotion cascades.
    pub fn remove_roster_entries(&self, pids: &HashSet<Pid>) {
        self.inner
            .write()
            .unwrap()
            .roster
            .retain(|e| !pids.contains(&e.pid));
    }

    /// Drop a pid's roster entry (used when a role-change demotes it to
    /// Follower, which has no roster representation).
    pub fn remove_roster_entry(&self, pid: Pid) {
        self.inner.write().unwrap().roster.retain(|e| e.pid != pid);
    }

    /// Replace the whole roster, the election-commit operation.
    pub fn rebuild_roster(&self, entries: Vec<RosterEntry>) {
        self.inner.write().unwrap().roster = entries;
    }

    pub fn clear_roster(&self) {
        self.inner.write().unwrap().roster.clear();
    }

    pub fn roster_snapshot(&self) -> Vec<RosterEntry> {
        self.inner.read().unwrap().roster.clone()
    }

    pub fn roster_is_empty(&self) -> bool {
        self.inner.read().unwrap().roster.is_empty()
    }

    pub fn roster_contains(&self, pid: Pid) -> bool {
        self.inner.read().unwrap().roster.iter().any(|e| e.pid == pid)
    }

    /// Whether any tier currently has a live holder: entry alive, pid not in
    /// the death set, and still heartbeating.
    pub fn has_alive_leader(&self) -> bool {
        let inner = self.inner.read().unwrap();
        inner.roster.iter().any(|e| {
            e.is_alive()
                && !inner.dead.contains(&e.pid)
                && inner.heartbeat_last_seen.contains_key(&e.pid)
        })
    }

    // ── election ballots ──

    /// Record a primary-election ballot. When the recorded ballot count
    /// reaches this node's alive count, the ballots are drained and returned
    /// for resolution; recording and the threshold check are one atomic step.
    pub fn record_ballot(&self, pid: Pid, score: f64) -> Option<HashMap<Pid, f64>> {
        let mut inner = self.inner.write().unwrap();
        inner.election_scores.insert(pid, score);
        if inner.election_scores.len() >= inner.alive.len() {
            Some(std::mem::take(&mut inner.election_scores))
        } else {
            None
        }
    }

    /// Record a Deputy2 candidacy. Drains and returns the candidate map once
    /// every alive Follower has responded (and there is at least one).
    pub fn record_deputy2_candidate(&self, pid: Pid, score: f64) -> Option<HashMap<Pid, f64>> {
        let mut inner = self.inner.write().unwrap();
        inner.deputy2_candidates.insert(pid, score);
        let follower_count = inner.alive_follower_count();
        if follower_count > 0 && inner.deputy2_candidates.len() >= follower_count {
            Some(std::mem::take(&mut inner.deputy2_candidates))
        } else {
            None
        }
    }

    pub fn pending_ballot_count(&self) -> usize {
        self.inner.read().unwrap().election_scores.len()
    }

    pub fn pending_deputy2_count(&self) -> usize {
        self.inner.read().unwrap().deputy2_candidates.len()
    }
}
