//! Reputation Engine
//!
//! Event-sourced scoring: a member's score is always the sum of the weights
//! of their unflagged entries in the action log. Recomputing therefore
//! never double counts, and flagging or unflagging an action is reflected
//! on the next recompute.
//!
//! Recomputation only ever writes score, badge, and the expert-review flag.
//! It never changes `role`; promotion happens through the vouch ledger or an
//! explicit staff action.

use crate::error::{ReputationError, Result};
use crate::metrics::{record_recompute, record_recompute_failure, TrustMetrics};
use crate::types::{ReputationConfig, ReputationStatus, ReputationTier};
use futures::stream::{self, StreamExt};
use remedyhub_core::{
    ActionId, ActionKind, ActionLog, BadgeType, CoreError, Profile, ProfileStore,
    QualifyingAction, ReputationUpdate, Role, TrustStore, UserId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Summary of a batch recomputation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    /// Users recomputed successfully
    pub recomputed: usize,

    /// Users whose recomputation failed, with the reason
    pub failed: Vec<(UserId, String)>,
}

/// Aggregates qualifying actions into scores and tiers
#[derive(Clone)]
pub struct ReputationEngine {
    store: Arc<dyn TrustStore>,
    config: Arc<ReputationConfig>,
    metrics: Option<Arc<TrustMetrics>>,
}

impl ReputationEngine {
    /// Create an engine over the given store
    pub fn new(store: Arc<dyn TrustStore>, config: ReputationConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            metrics: None,
        }
    }

    /// Attach a metrics collection
    pub fn with_metrics(mut self, metrics: Arc<TrustMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Get configuration
    pub fn config(&self) -> &ReputationConfig {
        &self.config
    }

    /// Map a score onto its tier
    pub fn tier_for(&self, score: u64) -> ReputationTier {
        self.config.thresholds.tier_for(score)
    }

    /// SME status for read-gating.
    ///
    /// True when any of: role at or above SME, legacy SME flag, a qualifying
    /// badge, score at the SME threshold, or the verified-expert flag.
    pub fn is_sme(&self, profile: &Profile) -> bool {
        profile.effective_role() >= Role::Sme
            || profile.legacy.is_sme
            || profile.badge.qualifies_as_sme()
            || profile.reputation_score >= self.config.thresholds.sme
            || profile.legacy.is_verified_expert
    }

    /// Build an action for `kind` using the configured weight unless one is given
    pub fn action_for(&self, user_id: UserId, kind: ActionKind, weight: Option<u32>) -> QualifyingAction {
        let weight = weight.unwrap_or_else(|| self.config.weights.weight_for(kind));
        QualifyingAction::new(user_id, kind).with_weight(weight)
    }

    /// Record a qualifying action and recompute the member's reputation
    pub async fn on_qualifying_action(
        &self,
        user_id: &UserId,
        kind: ActionKind,
        weight: Option<u32>,
    ) -> Result<ReputationStatus> {
        let action = self.action_for(user_id.clone(), kind, weight);
        self.record_action(action).await
    }

    /// Append a prepared action (idempotent on its id) and recompute
    pub async fn record_action(&self, action: QualifyingAction) -> Result<ReputationStatus> {
        let user_id = action.user_id.clone();
        if self.store.get_profile(&user_id).await?.is_none() {
            return Err(ReputationError::ProfileNotFound(user_id));
        }

        let appended = self
            .store
            .append_action(action)
            .await
            .map_err(|e| self.history_failure(&user_id, e))?;
        if !appended {
            debug!(user = %user_id, "Duplicate action ignored");
        }

        self.recompute(&user_id).await
    }

    /// Flag or unflag a logged action and recompute its owner.
    ///
    /// Returns `None` when the action id is unknown.
    pub async fn set_action_flag(
        &self,
        action_id: &ActionId,
        flagged: bool,
    ) -> Result<Option<ReputationStatus>> {
        let owner = self.store.set_action_flag(action_id, flagged).await?;
        match owner {
            Some(user_id) => Ok(Some(self.recompute(&user_id).await?)),
            None => Ok(None),
        }
    }

    /// Derive score and tier from the action log and persist changes.
    ///
    /// The read of the log and the write of the derived columns happen in
    /// one store operation, so concurrent recomputes for a user cannot
    /// commit a stale score. Idempotent: a second call with no new actions
    /// yields the same status and writes nothing. If the history cannot be
    /// read the stored profile is left untouched and the failure is
    /// returned.
    pub async fn recompute(&self, user_id: &UserId) -> Result<ReputationStatus> {
        let thresholds = &self.config.thresholds;
        let fold = |profile: &Profile, actions: &[QualifyingAction]| -> ReputationUpdate {
            let score: u64 = actions.iter().map(QualifyingAction::contribution).sum();
            let mut updated = profile.clone();
            updated.reputation_score = score;

            let crossed_review = profile.reputation_score < thresholds.expert_review
                && score >= thresholds.expert_review;
            if crossed_review && updated.effective_role() < Role::Sme {
                updated.needs_expert_review = true;
            }

            updated.badge = derive_badge(&updated, thresholds.tier_for(score));
            ReputationUpdate::of(&updated)
        };

        let change = self
            .store
            .apply_reputation(user_id, &fold)
            .await
            .map_err(|e| self.history_failure(user_id, e))?
            .ok_or_else(|| ReputationError::ProfileNotFound(user_id.clone()))?;

        let current = &change.current;
        if current.needs_expert_review && !change.previous.needs_expert_review {
            info!(user = %user_id, score = current.reputation_score, "Reputation crossed expert review threshold");
            if let Some(metrics) = &self.metrics {
                metrics.expert_review_flags_total.inc();
            }
        }
        if change.changed() {
            debug!(
                user = %user_id,
                score = current.reputation_score,
                tier = self.tier_for(current.reputation_score).name(),
                "Reputation updated"
            );
        }

        if let Some(metrics) = &self.metrics {
            record_recompute(metrics, current.reputation_score);
        }

        Ok(self.status_of(current))
    }

    /// Current stored status without recomputing
    pub async fn status(&self, user_id: &UserId) -> Result<ReputationStatus> {
        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| ReputationError::ProfileNotFound(user_id.clone()))?;
        Ok(self.status_of(&profile))
    }

    /// Clear the expert-review flag once the application is resolved
    pub async fn resolve_expert_review(&self, user_id: &UserId) -> Result<Profile> {
        let clear = |profile: &Profile, _: &[QualifyingAction]| ReputationUpdate {
            needs_expert_review: false,
            ..ReputationUpdate::of(profile)
        };

        let change = self
            .store
            .apply_reputation(user_id, &clear)
            .await?
            .ok_or_else(|| ReputationError::ProfileNotFound(user_id.clone()))?;

        if change.changed() {
            info!(user = %user_id, "Expert review resolved");
        }
        Ok(change.current)
    }

    /// Recompute every profile with bounded concurrency.
    ///
    /// Users are independent; a failure for one is recorded and the sweep
    /// continues.
    pub async fn recompute_all(&self, concurrency: usize) -> Result<SweepReport> {
        let user_ids = self.store.list_user_ids().await?;
        let total = user_ids.len();

        let results: Vec<(UserId, Result<ReputationStatus>)> = stream::iter(user_ids)
            .map(|user_id| async move {
                let result = self.recompute(&user_id).await;
                (user_id, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut report = SweepReport::default();
        for (user_id, result) in results {
            match result {
                Ok(_) => report.recomputed += 1,
                Err(e) => {
                    warn!(user = %user_id, error = %e, "Recompute failed during sweep");
                    report.failed.push((user_id, e.to_string()));
                }
            }
        }

        info!(
            "Reputation sweep finished: {}/{} recomputed, {} failed",
            report.recomputed,
            total,
            report.failed.len()
        );
        Ok(report)
    }

    fn status_of(&self, profile: &Profile) -> ReputationStatus {
        let tier = self.tier_for(profile.reputation_score);
        ReputationStatus {
            user_id: profile.user_id.clone(),
            score: profile.reputation_score,
            tier,
            tier_name: tier.name().to_string(),
            badge: profile.badge,
            needs_expert_review: profile.needs_expert_review,
            is_sme: self.is_sme(profile),
        }
    }

    fn history_failure(&self, user_id: &UserId, err: CoreError) -> ReputationError {
        warn!(user = %user_id, error = %err, "Action history unavailable, keeping stored reputation");
        if let Some(metrics) = &self.metrics {
            record_recompute_failure(metrics);
        }
        ReputationError::HistoryUnavailable {
            user_id: user_id.clone(),
            reason: err.to_string(),
        }
    }
}

/// Badge label for a profile; staff-granted badges are kept as is
fn derive_badge(profile: &Profile, tier: ReputationTier) -> BadgeType {
    if profile.badge.is_granted() {
        profile.badge
    } else if profile.effective_role() >= Role::Sme {
        BadgeType::Expert
    } else {
        tier.badge()
    }
}
