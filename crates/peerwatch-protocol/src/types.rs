use serde::{Deserialize, Serialize};

/// Process identifier. Assigned once at node creation, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub u32);

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a node in the hierarchy. Followers are eligible for promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    #[default]
    Follower,
    Deputy2,
    Deputy1,
    Boss,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Follower => "Follower",
            Role::Deputy2 => "Deputy2",
            Role::Deputy1 => "Deputy1",
            Role::Boss => "Boss",
        }
    }

    /// The leadership tier corresponding to this role, if any.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Role::Boss => Some(Tier::Boss),
            Role::Deputy1 => Some(Tier::Deputy1),
            Role::Deputy2 => Some(Tier::Deputy2),
            Role::Follower => None,
        }
    }

}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Leadership tier in the hierarchy, ordered by promotion priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Primary leader.
    Boss,
    /// First successor.
    Deputy1,
    /// Second successor.
    Deputy2,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Boss => "Boss",
            Tier::Deputy1 => "Deputy1",
            Tier::Deputy2 => "Deputy2",
        }
    }

    /// Audit label used once the holder of this tier is confirmed dead.
    pub fn ex_label(&self) -> &'static str {
        match self {
            Tier::Boss => "Ex-Boss",
            Tier::Deputy1 => "Ex-Deputy1",
            Tier::Deputy2 => "Ex-Deputy2",
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Tier::Boss => Role::Boss,
            Tier::Deputy1 => Role::Deputy1,
            Tier::Deputy2 => Role::Deputy2,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Liveness status of a roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RosterStatus {
    Alive,
    Dead,
}

/// One entry in the hierarchy roster (the "boss list").
///
/// Entries transition to `Dead` rather than being deleted so the roster keeps
/// an audit trail between monitor sweeps; only a full election reset or the
/// sweep itself removes entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub pid: Pid,
    pub tier: Tier,
    pub status: RosterStatus,
}

impl RosterEntry {
    pub fn alive(pid: Pid, tier: Tier) -> Self {
        Self {
            pid,
            tier,
            status: RosterStatus::Alive,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == RosterStatus::Alive
    }

    /// Display label for the entry: the tier name while alive, the
    /// `Ex-` prefixed tier once dead.
    pub fn label(&self) -> &'static str {
        match self.status {
            RosterStatus::Alive => self.tier.as_str(),
            RosterStatus::Dead => self.tier.ex_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tier_mapping() {
        assert_eq!(Role::Boss.tier(), Some(Tier::Boss));
        assert_eq!(Role::Deputy1.tier(), Some(Tier::Deputy1));
        assert_eq!(Role::Deputy2.tier(), Some(Tier::Deputy2));
        assert_eq!(Role::Follower.tier(), None);
    }

    #[test]
    fn test_default_role_is_follower() {
        assert_eq!(Role::default(), Role::Follower);
    }

    #[test]
    fn test_roster_entry_label() {
        let mut entry = RosterEntry::alive(Pid(7), Tier::Boss);
        assert_eq!(entry.label(), "Boss");
        entry.status = RosterStatus::Dead;
        assert_eq!(entry.label(), "Ex-Boss");
    }

    #[test]
    fn test_pid_serde_transparent() {
        let json = serde_json::to_string(&Pid(421)).unwrap();
        assert_eq!(json, "421");
        let pid: Pid = serde_json::from_str("421").unwrap();
        assert_eq!(pid, Pid(421));
    }
}
