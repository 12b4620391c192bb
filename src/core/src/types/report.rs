//! Spam reports filed by members against other members

use super::profile::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report unique per `(reporter_id, reported_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamReport {
    pub reporter_id: UserId,
    pub reported_id: UserId,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl SpamReport {
    pub fn new(reporter_id: UserId, reported_id: UserId, reason: impl Into<String>) -> Self {
        Self {
            reporter_id,
            reported_id,
            reason: reason.into(),
            created_at: Utc::now(),
        }
    }
}
