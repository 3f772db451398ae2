use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::types::{Pid, Role};

/// Named bus topics used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Heartbeat,
    Death,
    RoleChange,
    Election,
    Promotion,
    Deputy2Election,
}

impl Topic {
    /// All topics a node subscribes to.
    pub const ALL: [Topic; 6] = [
        Topic::Heartbeat,
        Topic::Death,
        Topic::RoleChange,
        Topic::Election,
        Topic::Promotion,
        Topic::Deputy2Election,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Heartbeat => "heartbeat",
            Topic::Death => "death",
            Topic::RoleChange => "role-change",
            Topic::Election => "election",
            Topic::Promotion => "promotion",
            Topic::Deputy2Election => "deputy2-election",
        }
    }

}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every message exchanged over the bus, as a tagged variant.
///
/// Parsing and validation happen once at the transport boundary; handlers
/// only ever see typed fields. All handlers must stay idempotent under
/// duplicate or out-of-order delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolMessage {
    /// Periodic liveness signal from a node.
    Heartbeat {
        pid: Pid,
        /// Informational wall-clock send time; protocol logic never reads it.
        sent_at: chrono::DateTime<chrono::Utc>,
    },
    /// A node announcing it observed a peer's death. The label carries the
    /// `Ex-` prefixed last known tier (or plain role for non-leaders).
    Death {
        pid: Pid,
        role_at_death: String,
        sent_at: chrono::DateTime<chrono::Utc>,
    },
    /// A node announcing its own role transition.
    RoleChange { pid: Pid, new_role: Role },
    /// Primary election ballot.
    Ballot { pid: Pid, score: f64 },
    /// Promotion signal: the current Deputy2 advances to Deputy1.
    PromoteDeputy2ToDeputy1,
    /// Resolution of a Deputy2 sub-election.
    NewDeputy2 { pid: Pid },
    /// Request for Follower candidacies to refill the Deputy2 tier.
    Deputy2Request,
    /// A Follower's candidacy for the Deputy2 tier.
    Deputy2Candidate { pid: Pid, score: f64 },
}

impl ProtocolMessage {
    /// The topic this message is published on.
    pub fn topic(&self) -> Topic {
        match self {
            ProtocolMessage::Heartbeat { .. } => Topic::Heartbeat,
            ProtocolMessage::Death { .. } => Topic::Death,
            ProtocolMessage::RoleChange { .. } => Topic::RoleChange,
            ProtocolMessage::Ballot { .. } => Topic::Election,
            ProtocolMessage::PromoteDeputy2ToDeputy1 => Topic::Promotion,
            ProtocolMessage::NewDeputy2 { .. } => Topic::Promotion,
            ProtocolMessage::Deputy2Request => Topic::Deputy2Election,
            ProtocolMessage::Deputy2Candidate { .. } => Topic::Deputy2Election,
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(payload: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn heartbeat(pid: Pid) -> Self {
        ProtocolMessage::Heartbeat {
            pid,
            sent_at: chrono::Utc::now(),
        }
    }

    pub fn death(pid: Pid, role_at_death: String) -> Self {
        ProtocolMessage::Death {
            pid,
            role_at_death,
            sent_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_names_are_distinct() {
        let names: std::collections::HashSet<&str> =
            Topic::ALL.iter().map(Topic::as_str).collect();
        assert_eq!(names.len(), Topic::ALL.len());
    }

    #[test]
    fn test_message_topics() {
        assert_eq!(ProtocolMessage::heartbeat(Pid(1)).topic(), Topic::Heartbeat);
        assert_eq!(
            ProtocolMessage::death(Pid(1), "Ex-Boss".into()).topic(),
            Topic::Death
        );
        assert_eq!(
            ProtocolMessage::Ballot {
                pid: Pid(1),
                score: 3.5
            }
            .topic(),
            Topic::Election
        );
        assert_eq!(
            ProtocolMessage::PromoteDeputy2ToDeputy1.topic(),
            Topic::Promotion
        );
        assert_eq!(
            ProtocolMessage::NewDeputy2 { pid: Pid(2) }.topic(),
            Topic::Promotion
        );
        assert_eq!(ProtocolMessage::Deputy2Request.topic(), Topic::Deputy2Election);
    }

    #[test]
    fn test_ballot_encode_decode() {
        let msg = ProtocolMessage::Ballot {
            pid: Pid(421),
            score: 12.75,
        };
        let payload = msg.encode().unwrap();
        assert!(payload.contains("ballot"));

        match ProtocolMessage::decode(&payload).unwrap() {
            ProtocolMessage::Ballot { pid, score } => {
                assert_eq!(pid, Pid(421));
                assert!((score - 12.75).abs() < 1e-12);
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_death_carries_ex_label() {
        let payload = ProtocolMessage::death(Pid(9), "Ex-Deputy1".into())
            .encode()
            .unwrap();
        match ProtocolMessage::decode(&payload).unwrap() {
            ProtocolMessage::Death { pid, role_at_death, .. } => {
                assert_eq!(pid, Pid(9));
                assert_eq!(role_at_death, "Ex-Deputy1");
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_payload_rejected() {
        assert!(matches!(
            ProtocolMessage::decode("HEARTBEAT:421"),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }
}
