//! Qualifying actions recorded in the append-only action log

use super::profile::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique action identifier; appends are idempotent on this key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        ActionId(id.into())
    }

    /// Generate a random action ID
    pub fn generate() -> Self {
        ActionId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Community actions that earn reputation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Another member marked one of the user's contributions helpful
    HelpfulVoteReceived,
    /// The user's answer was accepted
    AcceptedAnswer,
    /// A review by the user was published without flags
    ReviewPublished,
    /// A bounty the user worked on was resolved and credited
    BountyCreditResolved,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::HelpfulVoteReceived,
        ActionKind::AcceptedAnswer,
        ActionKind::ReviewPublished,
        ActionKind::BountyCreditResolved,
    ];

    /// Weight used when the caller does not supply one
    pub fn default_weight(&self) -> u32 {
        match self {
            ActionKind::HelpfulVoteReceived => 5,
            ActionKind::AcceptedAnswer => 15,
            ActionKind::ReviewPublished => 10,
            ActionKind::BountyCreditResolved => 25,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::HelpfulVoteReceived => "helpful_vote_received",
            ActionKind::AcceptedAnswer => "accepted_answer",
            ActionKind::ReviewPublished => "review_published",
            ActionKind::BountyCreditResolved => "bounty_credit_resolved",
        }
    }

    pub fn parse(s: &str) -> Option<ActionKind> {
        ActionKind::ALL.iter().copied().find(|kind| kind.as_str() == s)
    }
}

/// Entry in the append-only action log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingAction {
    pub action_id: ActionId,

    /// Member credited with the action
    pub user_id: UserId,

    pub kind: ActionKind,

    /// Reputation points contributed while unflagged
    pub weight: u32,

    /// Domain object the action relates to (e.g. a product)
    #[serde(default)]
    pub context_id: Option<String>,

    /// Flagged actions stay in the log but do not count
    #[serde(default)]
    pub flagged: bool,

    pub recorded_at: DateTime<Utc>,
}

impl QualifyingAction {
    /// New unflagged action with the kind's default weight
    pub fn new(user_id: UserId, kind: ActionKind) -> Self {
        Self {
            action_id: ActionId::generate(),
            user_id,
            kind,
            weight: kind.default_weight(),
            context_id: None,
            flagged: false,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, action_id: ActionId) -> Self {
        self.action_id = action_id;
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_context(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    pub fn flagged(mut self, flagged: bool) -> Self {
        self.flagged = flagged;
        self
    }

    /// Points this entry contributes to the score
    pub fn contribution(&self) -> u64 {
        if self.flagged {
            0
        } else {
            u64::from(self.weight)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flagged_action_contributes_nothing() {
        let action = QualifyingAction::new(UserId::new("u"), ActionKind::AcceptedAnswer);
        assert_eq!(action.contribution(), 15);
        assert_eq!(action.flagged(true).contribution(), 0);
    }

    #[test]
    fn test_kind_names() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ActionKind::parse("login"), None);
    }
}
