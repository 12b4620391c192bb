//! Vouch Ledger
//!
//! Peer endorsements as an alternate promotion path. A member at or above
//! the configured voucher role may vouch once for a lower-ranked peer; the
//! vouch that brings the target's count to the threshold promotes them.
//!
//! Insert and promotion happen inside one store call, so two concurrent
//! vouches landing at the threshold promote exactly once.

use crate::error::{ReputationError, Result};
use crate::metrics::{record_vouch, TrustMetrics};
use crate::types::{VouchConfig, VouchOutcome};
use remedyhub_core::{Profile, ProfileStore, TrustStore, UserId, VouchInsert, VouchRecord, VouchStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Records vouches and promotes targets at the threshold
#[derive(Clone)]
pub struct VouchLedger {
    store: Arc<dyn TrustStore>,
    config: VouchConfig,
    metrics: Option<Arc<TrustMetrics>>,
}

impl VouchLedger {
    pub fn new(store: Arc<dyn TrustStore>, config: VouchConfig) -> Self {
        Self {
            store,
            config,
            metrics: None,
        }
    }

    /// Attach a metrics collection
    pub fn with_metrics(mut self, metrics: Arc<TrustMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &VouchConfig {
        &self.config
    }

    /// Submit a vouch from `voucher_id` for `target_id`.
    ///
    /// Preconditions are checked in order and the first failure is
    /// returned: voucher exists and is not banned, voucher role is high
    /// enough, target is below that role, voucher and target differ. A pair
    /// that is already recorded is not an error: the call succeeds with
    /// `accepted == false` and the stored count.
    pub async fn submit_vouch(&self, voucher_id: &UserId, target_id: &UserId) -> Result<VouchOutcome> {
        let result = self.try_submit(voucher_id, target_id).await;

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(outcome) if outcome.accepted => record_vouch(metrics, "accepted", outcome.promoted),
                Ok(_) => record_vouch(metrics, "duplicate", false),
                Err(_) => record_vouch(metrics, "rejected", false),
            }
        }
        result
    }

    async fn try_submit(&self, voucher_id: &UserId, target_id: &UserId) -> Result<VouchOutcome> {
        if voucher_id.is_blank() {
            return Err(ReputationError::InvalidInput("voucher id is empty".to_string()));
        }
        if target_id.is_blank() {
            return Err(ReputationError::InvalidInput("vouch target is empty".to_string()));
        }

        let voucher = self.load(voucher_id).await?;
        if voucher.is_banned {
            return Err(ReputationError::VoucherBanned(voucher_id.clone()));
        }

        let min_role = self.config.min_voucher_role;
        let voucher_role = voucher.effective_role();
        if !voucher_role.satisfies(min_role) {
            return Err(ReputationError::InsufficientRole {
                user_id: voucher_id.clone(),
                role: voucher_role,
                required: min_role,
            });
        }

        let target = self.load(target_id).await?;
        let target_role = target.effective_role();
        if target_role.satisfies(min_role) {
            return Err(ReputationError::TargetAlreadyElevated {
                target_id: target_id.clone(),
                role: target_role,
            });
        }

        if voucher_id == target_id {
            return Err(ReputationError::SelfVouch);
        }

        let record = VouchRecord::new(voucher_id.clone(), target_id.clone());
        let inserted = self
            .store
            .insert_vouch(record, self.config.promotion_threshold, self.config.promote_to)
            .await?;

        match inserted {
            VouchInsert::Duplicate { vouch_count } => {
                debug!(voucher = %voucher_id, target = %target_id, "Duplicate vouch ignored");
                Ok(VouchOutcome {
                    accepted: false,
                    vouch_count,
                    promoted: false,
                    message: format!("{} has already vouched for {}", voucher_id, target_id),
                })
            }
            VouchInsert::Inserted { vouch_count, promoted } => {
                let message = if promoted {
                    info!(
                        target = %target_id,
                        vouch_count,
                        role = %self.config.promote_to,
                        "Vouch threshold reached, target promoted"
                    );
                    format!("{} promoted to {}", target_id, self.config.promote_to)
                } else {
                    debug!(voucher = %voucher_id, target = %target_id, vouch_count, "Vouch recorded");
                    format!(
                        "Vouch recorded ({}/{})",
                        vouch_count.min(self.config.promotion_threshold),
                        self.config.promotion_threshold
                    )
                };
                Ok(VouchOutcome {
                    accepted: true,
                    vouch_count,
                    promoted,
                    message,
                })
            }
        }
    }

    /// Stored vouch count for a user
    pub async fn vouch_count(&self, target_id: &UserId) -> Result<u32> {
        Ok(self.store.vouch_count(target_id).await?)
    }

    async fn load(&self, user_id: &UserId) -> Result<Profile> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| ReputationError::ProfileNotFound(user_id.clone()))
    }
}
