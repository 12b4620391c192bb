//! Peer vouch records

use super::profile::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only peer endorsement, unique on `(voucher_id, target_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VouchRecord {
    pub voucher_id: UserId,
    pub target_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl VouchRecord {
    pub fn new(voucher_id: UserId, target_id: UserId) -> Self {
        Self {
            voucher_id,
            target_id,
            created_at: Utc::now(),
        }
    }

    /// Uniqueness key
    pub fn key(&self) -> (&UserId, &UserId) {
        (&self.voucher_id, &self.target_id)
    }
}
