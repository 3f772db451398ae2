use peerwatch_protocol::{Role, Tier};

/// What a node must do after a tiered leader's death, decided purely from
/// the dead tier and the node's own current role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeOutcome {
    /// The role this node advances itself to, if any.
    pub new_local_role: Option<Role>,
    /// Whether to broadcast the Deputy2→Deputy1 promotion signal.
    pub signal_deputy1_promotion: bool,
    /// Whether to start a Deputy2 refill sub-election.
    pub refill_deputy2: bool,
}

impl CascadeOutcome {
    const NOTHING: CascadeOutcome = CascadeOutcome {
        new_local_role: None,
        signal_deputy1_promotion: false,
        refill_deputy2: false,
    };
}

/// The promotion rule table.
///
/// A Deputy2 seeing the Boss die does nothing yet: it waits for the new
/// Boss's Deputy2→Deputy1 signal rather than promoting itself, so the
/// cascade advances one rank at a time.
pub fn on_leader_death(dead_tier: Tier, local_role: Role) -> CascadeOutcome {
    match (dead_tier, local_role) {
        (Tier::Deputy2, Role::Follower) => CascadeOutcome {
            refill_deputy2: true,
            ..CascadeOutcome::NOTHING
        },
        (Tier::Deputy2, _) => CascadeOutcome::NOTHING,

        (Tier::Deputy1, Role::Deputy2) => CascadeOutcome {
            new_local_role: Some(Role::Deputy1),
            refill_deputy2: true,
            ..CascadeOutcome::NOTHING
        },
        (Tier::Deputy1, Role::Follower) => CascadeOutcome {
            refill_deputy2: true,
            ..CascadeOutcome::NOTHING
        },
        (Tier::Deputy1, _) => CascadeOutcome::NOTHING,

        (Tier::Boss, Role::Deputy1) => CascadeOutcome {
            new_local_role: Some(Role::Boss),
            signal_deputy1_promotion: true,
            refill_deputy2: true,
        },
        (Tier::Boss, _) => CascadeOutcome::NOTHING,
    }
}

/// React to the broadcast Deputy2→Deputy1 promotion signal: only a current
/// Deputy2 advances.
pub fn on_promotion_signal(local_role: Role) -> Option<Role> {
    (local_role == Role::Deputy2).then_some(Role::Deputy1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deputy1_becomes_boss_on_boss_death() {
        let outcome = on_leader_death(Tier::Boss, Role::Deputy1);
        assert_eq!(outcome.new_local_role, Some(Role::Boss));
        assert!(outcome.signal_deputy1_promotion);
        assert!(outcome.refill_deputy2);
    }

    #[test]
    fn test_follower_unchanged_on_boss_death() {
        let outcome = on_leader_death(Tier::Boss, Role::Follower);
        assert_eq!(outcome, CascadeOutcome::NOTHING);
    }

    #[test]
    fn test_deputy2_waits_on_boss_death() {
        // Deputy2 promotes only on receiving the signal, never directly.
        let outcome = on_leader_death(Tier::Boss, Role::Deputy2);
        assert_eq!(outcome, CascadeOutcome::NOTHING);
    }

    #[test]
    fn test_deputy2_advances_on_deputy1_death() {
        let outcome = on_leader_death(Tier::Deputy1, Role::Deputy2);
        assert_eq!(outcome.new_local_role, Some(Role::Deputy1));
        assert!(!outcome.signal_deputy1_promotion);
        assert!(outcome.refill_deputy2);
    }

    #[test]
    fn test_follower_refills_on_deputy1_death() {
        let outcome = on_leader_death(Tier::Deputy1, Role::Follower);
        assert_eq!(outcome.new_local_role, None);
        assert!(outcome.refill_deputy2);
    }

    #[test]
    fn test_boss_ignores_deputy1_death() {
        assert_eq!(on_leader_death(Tier::Deputy1, Role::Boss), CascadeOutcome::NOTHING);
    }

    #[test]
    fn test_deputy2_death_triggers_refill_from_followers_only() {
        assert!(on_leader_death(Tier::Deputy2, Role::Follower).refill_deputy2);
        assert_eq!(on_leader_death(Tier::Deputy2, Role::Boss), CascadeOutcome::NOTHING);
        assert_eq!(on_leader_death(Tier::Deputy2, Role::Deputy1), CascadeOutcome::NOTHING);
        assert_eq!(on_leader_death(Tier::Deputy2, Role::Deputy2), CascadeOutcome::NOTHING);
    }

    #[test]
    fn test_promotion_signal_only_moves_deputy2() {
        assert_eq!(on_promotion_signal(Role::Deputy2), Some(Role::Deputy1));
        assert_eq!(on_promotion_signal(Role::Follower), None);
        assert_eq!(on_promotion_signal(Role::Boss), None);
        assert_eq!(on_promotion_signal(Role::Deputy1), None);
    }
}
