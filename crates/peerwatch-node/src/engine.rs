//! The per-node protocol engine.
//!
//! All protocol decisions live here. The router feeds inbound messages to
//! [`ProtocolEngine::handle_message`], the monitor drives
//! [`ProtocolEngine::run_scan`], and both paths mutate the same
//! [`ClusterView`] through its atomic methods. Every handler is idempotent
//! under duplicate or reordered delivery, which is all the bus guarantees.
//!
//! The engine never records its own ballots or candidacies directly: it only
//! publishes them, and the self-delivered copy comes back through the router
//! like any peer's message. That keeps each record-and-threshold check in
//! exactly one code path.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use peerwatch_bus::ClusterBus;
use peerwatch_election::{ballot_score, resolve_deputy2, resolve_primary, LoadSampler};
use peerwatch_hierarchy::{on_leader_death, on_promotion_signal};
use peerwatch_protocol::{Pid, ProtocolMessage, Role, Tier};
use peerwatch_state::ClusterView;

use crate::config::NodeConfig;

pub struct ProtocolEngine {
    view: Arc<ClusterView>,
    bus: ClusterBus,
    load: Box<dyn LoadSampler>,
    cfg: NodeConfig,
}

impl ProtocolEngine {
    pub fn new(
        view: Arc<ClusterView>,
        bus: ClusterBus,
        load: Box<dyn LoadSampler>,
        cfg: NodeConfig,
    ) -> Self {
        Self {
            view,
            bus,
            load,
            cfg,
        }
    }

    pub fn view(&self) -> &Arc<ClusterView> {
        &self.view
    }

    fn pid(&self) -> Pid {
        self.view.pid()
    }

    /// Encode and publish. Transport problems are logged and swallowed: a
    /// lost message is indistinguishable from a dropped packet, and the
    /// timeout path already covers those.
    fn publish(&self, msg: &ProtocolMessage) {
        match msg.encode() {
            Ok(payload) => self.bus.publish(msg.topic(), payload),
            Err(e) => tracing::error!(pid = %self.pid(), error = %e, "failed to encode outbound message"),
        }
    }

    /// Adopt a new local role, write it through to the directory, and
    /// announce it. A no-op when the role is unchanged.
    fn set_local_role(&self, role: Role) {
        if self.view.local_role() == role {
            return;
        }
        self.view.set_local_role(role);
        tracing::info!(pid = %self.pid(), role = role.as_str(), "role changed");
        self.publish(&ProtocolMessage::RoleChange {
            pid: self.pid(),
            new_role: role,
        });
    }

    // ── inbound dispatch ──

    pub fn handle_message(&self, msg: ProtocolMessage, now: Instant) {
        match msg {
            ProtocolMessage::Heartbeat { pid, .. } => {
                self.view.mark_alive(pid, now);
            }
            ProtocolMessage::Death {
                pid, role_at_death, ..
            } => self.on_death_announcement(pid, &role_at_death),
            ProtocolMessage::RoleChange { pid, new_role } => {
                self.view.set_peer_role(pid, new_role);
                match new_role.tier() {
                    Some(tier) => self.view.upsert_roster_entry(pid, tier),
                    // Followers have no roster representation.
                    None => self.view.remove_roster_entry(pid),
                }
            }
            ProtocolMessage::Ballot { pid, score } => {
                if let Some(ballots) = self.view.record_ballot(pid, score) {
                    self.commit_primary(&ballots);
                }
            }
            ProtocolMessage::PromoteDeputy2ToDeputy1 => {
                if let Some(role) = on_promotion_signal(self.view.local_role()) {
                    self.set_local_role(role);
                }
            }
            ProtocolMessage::NewDeputy2 { pid } => self.on_new_deputy2(pid),
            ProtocolMessage::Deputy2Request => self.on_deputy2_request(now),
            ProtocolMessage::Deputy2Candidate { pid, score } => {
                if let Some(candidates) = self.view.record_deputy2_candidate(pid, score) {
                    if let Some(winner) = resolve_deputy2(&candidates) {
                        tracing::info!(pid = %self.pid(), winner = %winner, "deputy2 sub-election resolved");
                        self.publish(&ProtocolMessage::NewDeputy2 { pid: winner });
                    }
                }
            }
        }
    }

    /// Apply a peer-announced death exactly once; repeats are no-ops thanks
    /// to the monotonic death set.
    fn on_death_announcement(&self, pid: Pid, role_at_death: &str) {
        if !self.view.mark_dead(pid) {
            return;
        }
        self.view.remove_heartbeat(pid);
        self.view.mark_roster_dead(pid);
        tracing::info!(pid = %self.pid(), dead = %pid, role_at_death, "peer death announced");
    }

    fn on_new_deputy2(&self, winner: Pid) {
        self.view.set_peer_role(winner, Role::Deputy2);
        self.view.upsert_roster_entry(winner, Tier::Deputy2);
        if winner == self.pid() {
            self.set_local_role(Role::Deputy2);
        }
    }

    /// Only Followers answer a refill request; everyone else stays quiet.
    fn on_deputy2_request(&self, now: Instant) {
        if self.view.local_role() != Role::Follower {
            return;
        }
        let score = ballot_score(self.view.uptime_secs(now), self.load.sample());
        self.publish(&ProtocolMessage::Deputy2Candidate {
            pid: self.pid(),
            score,
        });
    }

    // ── elections ──

    /// Broadcast this node's ballot for a primary election. The ballot is
    /// recorded when the self-delivered copy arrives back at the router.
    pub fn start_election(&self, now: Instant) {
        let score = ballot_score(self.view.uptime_secs(now), self.load.sample());
        tracing::info!(pid = %self.pid(), score, "starting primary election");
        self.publish(&ProtocolMessage::Ballot {
            pid: self.pid(),
            score,
        });
    }

    /// Commit a resolved primary election: roster rebuilt from scratch, the
    /// role directory updated for every assigned tier, local role adopted.
    fn commit_primary(&self, ballots: &std::collections::HashMap<Pid, f64>) {
        let Some(assignment) = resolve_primary(ballots) else {
            return;
        };
        let entries = assignment.roster_entries();
        for entry in &entries {
            self.view.set_peer_role(entry.pid, entry.tier.role());
        }
        self.view.rebuild_roster(entries);
        tracing::info!(
            pid = %self.pid(),
            boss = %assignment.boss,
            deputy1 = ?assignment.deputy1,
            deputy2 = ?assignment.deputy2,
            "primary election resolved"
        );
        self.set_local_role(assignment.role_of(self.pid()));
    }

    fn start_deputy2_refill(&self) {
        tracing::info!(pid = %self.pid(), "requesting deputy2 refill");
        self.publish(&ProtocolMessage::Deputy2Request);
    }

    /// Advance this node's own role according to the cascade table and emit
    /// whatever follow-up messages the table asks for.
    fn apply_cascade(&self, dead_tier: Tier) {
        let outcome = on_leader_death(dead_tier, self.view.local_role());
        if let Some(role) = outcome.new_local_role {
            self.set_local_role(role);
        }
        if outcome.signal_deputy1_promotion {
            self.publish(&ProtocolMessage::PromoteDeputy2ToDeputy1);
        }
        if outcome.refill_deputy2 {
            self.start_deputy2_refill();
        }
    }

    // ── failure detection ──

    /// One monitor pass: timeout detection, roster sweep, election triggers.
    ///
    /// Takes the scan instant as a parameter so the timeout boundary is
    /// testable without waiting out real clocks.
    pub fn run_scan(&self, now: Instant) {
        // (pid, tier) pairs whose cascade already ran this scan, so the
        // sweep below does not trigger it a second time.
        let mut cascaded: HashSet<(Pid, Tier)> = HashSet::new();

        for (pid, last_seen) in self.view.heartbeat_snapshot() {
            if now.saturating_duration_since(last_seen) <= self.cfg.heartbeat_timeout {
                continue;
            }
            let new_death = self.view.mark_dead(pid);
            self.view.remove_heartbeat(pid);
            if !new_death {
                continue;
            }
            let tier = self.view.mark_roster_dead(pid);
            let label = match tier {
                Some(t) => t.ex_label().to_string(),
                None => self.view.role_of(pid).as_str().to_string(),
            };
            tracing::info!(pid = %self.pid(), dead = %pid, label, "peer timed out");
            self.publish(&ProtocolMessage::death(pid, label));
            if let Some(t) = tier {
                self.apply_cascade(t);
                cascaded.insert((pid, t));
            }
        }

        // Sweep the roster: entries for dead or silent pids cascade (unless
        // the timeout pass above already did) and are then removed.
        let mut swept: HashSet<Pid> = HashSet::new();
        for entry in self.view.roster_snapshot() {
            let gone = self.view.is_dead(entry.pid) || !self.view.has_heartbeat(entry.pid);
            if !gone {
                continue;
            }
            self.view.mark_dead(entry.pid);
            if !cascaded.contains(&(entry.pid, entry.tier)) {
                self.apply_cascade(entry.tier);
            }
            swept.insert(entry.pid);
        }
        if !swept.is_empty() {
            self.view.remove_roster_entries(&swept);
        }

        // A node holding a tier must appear in its own roster.
        if let Some(tier) = self.view.local_role().tier() {
            if !self.view.roster_contains(self.pid()) {
                self.view.upsert_roster_entry(self.pid(), tier);
            }
        }

        // Re-ballot on every leaderless scan. The bus may drop messages, so
        // a single broadcast is not enough: periodic replay is what lets a
        // stalled election make progress, and recording is an idempotent
        // map insert, so duplicates are harmless.
        if self.view.roster_is_empty() || !self.view.has_alive_leader() {
            self.start_election(now);
        }

        if self.view.alive_count() == 1 {
            tracing::warn!(pid = %self.pid(), "last node standing");
        }
    }
}
