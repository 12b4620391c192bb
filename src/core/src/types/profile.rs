//! Member profile types

use super::role::{effective_role, LegacyFlags, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable member identity supplied by the authentication boundary
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user ID
    pub fn new<S: Into<String>>(id: S) -> Self {
        UserId(id.into())
    }

    /// Get the user ID as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// Display badge shown next to a member's name.
///
/// Badges are derived labels; `VerifiedExpert` and `Brand` are granted by
/// staff and survive recomputation, the rest follow score and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    #[default]
    None,
    Contributor,
    TrustedReviewer,
    Expert,
    VerifiedExpert,
    Brand,
}

impl BadgeType {
    /// Badges that count toward SME status for read-gating
    pub fn qualifies_as_sme(&self) -> bool {
        matches!(self, BadgeType::Expert | BadgeType::VerifiedExpert)
    }

    /// Badges granted by staff rather than derived
    pub fn is_granted(&self) -> bool {
        matches!(self, BadgeType::VerifiedExpert | BadgeType::Brand)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::None => "none",
            BadgeType::Contributor => "contributor",
            BadgeType::TrustedReviewer => "trusted_reviewer",
            BadgeType::Expert => "expert",
            BadgeType::VerifiedExpert => "verified_expert",
            BadgeType::Brand => "brand",
        }
    }

    pub fn parse(s: &str) -> BadgeType {
        match s {
            "contributor" => BadgeType::Contributor,
            "trusted_reviewer" => BadgeType::TrustedReviewer,
            "expert" => BadgeType::Expert,
            "verified_expert" => BadgeType::VerifiedExpert,
            "brand" => BadgeType::Brand,
            _ => BadgeType::None,
        }
    }
}

/// One profile per member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity key
    pub user_id: UserId,

    /// Display name captured at bootstrap
    #[serde(default)]
    pub display_name: Option<String>,

    /// Verified-email attribute captured at bootstrap
    #[serde(default)]
    pub email_verified: bool,

    /// Non-negative reputation accumulator
    pub reputation_score: u64,

    /// Explicit role; `None` on rows predating the role migration
    #[serde(default)]
    pub role: Option<Role>,

    /// Pre-migration boolean flags
    #[serde(default)]
    pub legacy: LegacyFlags,

    /// Derived display label
    #[serde(default)]
    pub badge: BadgeType,

    /// Set when reputation crosses the expert-review threshold
    #[serde(default)]
    pub needs_expert_review: bool,

    #[serde(default)]
    pub is_banned: bool,

    /// Number of stored vouches targeting this member
    #[serde(default)]
    pub vouch_count: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Fresh profile with reputation 0 and role `Standard`
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            display_name: None,
            email_verified: false,
            reputation_score: 0,
            role: Some(Role::Standard),
            legacy: LegacyFlags::default(),
            badge: BadgeType::None,
            needs_expert_review: false,
            is_banned: false,
            vouch_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the explicit role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Replace the legacy flags and drop the explicit role, as on an
    /// unmigrated row
    pub fn with_legacy_flags(mut self, legacy: LegacyFlags) -> Self {
        self.role = None;
        self.legacy = legacy;
        self
    }

    /// Role used for authorization and promotion decisions
    pub fn effective_role(&self) -> Role {
        effective_role(self.role, &self.legacy)
    }

    /// Mark the row as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
