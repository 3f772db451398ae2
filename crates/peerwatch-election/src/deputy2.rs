use std::collections::HashMap;

use peerwatch_protocol::Pid;

/// Resolve a Deputy2 sub-election: highest candidate score wins, ties broken
/// by higher pid. None when no candidacies were collected.
pub fn resolve_deputy2(candidates: &HashMap<Pid, f64>) -> Option<Pid> {
    candidates
        .iter()
        .max_by(|a, b| {
            a.1.partial_cmp(b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        })
        .map(|(pid, _)| *pid)
}
