//! Stored community content (reviews, comments, profile claims)

use super::action::ActionId;
use super::profile::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        ContentId(id.into())
    }

    pub fn generate() -> Self {
        ContentId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Review,
    Comment,
    ProfileClaim,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Review => "review",
            ContentKind::Comment => "comment",
            ContentKind::ProfileClaim => "profile_claim",
        }
    }

    pub fn parse(s: &str) -> Option<ContentKind> {
        match s {
            "review" => Some(ContentKind::Review),
            "comment" => Some(ContentKind::Comment),
            "profile_claim" => Some(ContentKind::ProfileClaim),
            _ => None,
        }
    }
}

/// Content row as persisted after admission.
///
/// Flagged content is stored but hidden until a moderator clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub content_id: ContentId,
    pub author_id: UserId,
    pub kind: ContentKind,

    /// Product the content discusses, if any
    #[serde(default)]
    pub product_id: Option<String>,

    pub body: String,

    #[serde(default)]
    pub citations: Vec<String>,

    pub is_flagged: bool,
    pub flag_count: u32,

    /// Machine-readable reasons attached at admission
    #[serde(default)]
    pub flag_reasons: Vec<String>,

    /// Qualifying action credited for this content
    #[serde(default)]
    pub action_id: Option<ActionId>,

    pub created_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn new(author_id: UserId, kind: ContentKind, body: impl Into<String>) -> Self {
        Self {
            content_id: ContentId::generate(),
            author_id,
            kind,
            product_id: None,
            body: body.into(),
            citations: Vec::new(),
            is_flagged: false,
            flag_count: 0,
            flag_reasons: Vec::new(),
            action_id: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the row as auto-flagged on entry into moderation
    pub fn auto_flag(&mut self, reason: impl Into<String>) {
        self.is_flagged = true;
        self.flag_count = 1;
        self.flag_reasons.push(reason.into());
    }

    /// Whether the row is shown publicly
    pub fn is_visible(&self) -> bool {
        !self.is_flagged
    }
}
