//! Trust engine facade
//!
//! Wires the control flow for content-producing actions:
//! citations, then blacklist, then moderation decide whether content is
//! stored visible or auto-flagged; the stored review then feeds the
//! reputation engine. Vouches and staff actions go through the role
//! authorizer first.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use remedyhub_authz::{AuthzDecision, Capability, RoleAuthorizer};
use remedyhub_core::{
    ActionKind, ContentId, ContentKind, ContentRecord, ContentStore, Profile, ProfileStore,
    QualifyingAction, Role, TrustStore, UserId,
};
use remedyhub_moderation::{
    BlacklistCache, CitationAllowList, CitationValidator, KeywordSource, ModerationClient,
    ModerationGateway, ModerationVerdict, SpamReportDesk, SpamReportOutcome,
};
use remedyhub_reputation::{
    CredibilityScorer, ReputationEngine, ReputationStatus, SweepReport, TrustMetrics,
    VouchLedger, VouchOutcome,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authenticated caller attributes used for profile bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id.into()),
            display_name: None,
            email_verified: false,
        }
    }
}

/// Review as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    #[serde(default)]
    pub product_id: Option<String>,
    pub body: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

/// Outcome of a review submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReceipt {
    pub content_id: ContentId,
    pub is_flagged: bool,
    pub flag_count: u32,
    pub flag_reasons: Vec<String>,
    pub moderation: ModerationVerdict,
    pub reputation: ReputationStatus,
}

/// Outcome of clearing flags on content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnflagReceipt {
    pub content: ContentRecord,
    pub reputation: Option<ReputationStatus>,
}

pub struct TrustEngine {
    store: Arc<dyn TrustStore>,
    reputation: ReputationEngine,
    vouches: VouchLedger,
    authorizer: RoleAuthorizer,
    citations: CitationValidator,
    blacklist: BlacklistCache,
    gateway: ModerationGateway,
    spam: SpamReportDesk,
}

impl TrustEngine {
    pub fn new(
        store: Arc<dyn TrustStore>,
        moderation: Arc<dyn ModerationClient>,
        keywords: Arc<dyn KeywordSource>,
        config: &EngineConfig,
    ) -> Self {
        let scorer = CredibilityScorer::new(
            store.clone(),
            config.credibility.clone(),
            config.reputation.thresholds.clone(),
        );

        Self {
            reputation: ReputationEngine::new(store.clone(), config.reputation.clone()),
            vouches: VouchLedger::new(store.clone(), config.vouch.clone()),
            authorizer: RoleAuthorizer::new(store.clone()),
            citations: CitationValidator::new(CitationAllowList::from_config(&config.citations)),
            blacklist: BlacklistCache::from_config(keywords, &config.blacklist),
            gateway: ModerationGateway::new(moderation, scorer, config.moderation.policy.clone()),
            spam: SpamReportDesk::new(store.clone(), config.spam.clone()),
            store,
        }
    }

    /// Attach a metrics collection to every component that reports
    pub fn with_metrics(mut self, metrics: Arc<TrustMetrics>) -> Self {
        self.reputation = self.reputation.with_metrics(metrics.clone());
        self.vouches = self.vouches.with_metrics(metrics.clone());
        self.gateway = self.gateway.with_metrics(metrics);
        self
    }

    pub fn reputation(&self) -> &ReputationEngine {
        &self.reputation
    }

    pub fn citations(&self) -> &CitationValidator {
        &self.citations
    }

    /// Create the caller's profile on first authenticated action.
    ///
    /// Existing profiles are returned unchanged.
    pub async fn bootstrap_profile(&self, identity: &Identity) -> Result<Profile> {
        if identity.user_id.is_blank() {
            return Err(EngineError::InvalidInput("user id is empty".to_string()));
        }

        let mut profile = Profile::new(identity.user_id.clone());
        profile.display_name = identity.display_name.clone();
        profile.email_verified = identity.email_verified;

        let stored = self.store.insert_profile_if_absent(profile).await?;
        debug!(user = %stored.user_id, "Profile ready");
        Ok(stored)
    }

    /// Admit a review and credit its author.
    ///
    /// Invalid citations reject the submission. Blacklisted keywords or a
    /// moderation hold store the review flagged and hidden; its reputation
    /// credit is recorded but does not count until the review is unflagged.
    /// The review and its credit are stored together or not at all.
    pub async fn submit_review(&self, author: &Identity, draft: ReviewDraft) -> Result<ReviewReceipt> {
        if draft.body.trim().is_empty() {
            return Err(EngineError::InvalidInput("review body is empty".to_string()));
        }

        let profile = self.bootstrap_profile(author).await?;
        if profile.is_banned {
            return Err(EngineError::Banned(profile.user_id));
        }

        if let Some((index, result)) = self.citations.validate_all(&draft.citations) {
            return Err(EngineError::InvalidCitation {
                citation: draft.citations[index].clone(),
                reason: result.reason.unwrap_or_default(),
            });
        }

        let snapshot = self.blacklist.snapshot().await;
        let matches = snapshot.scan(&draft.body);

        let verdict = self
            .gateway
            .moderate_in_context(&draft.body, Some(&profile.user_id), draft.product_id.as_deref())
            .await;

        let mut record = ContentRecord::new(profile.user_id.clone(), ContentKind::Review, draft.body);
        record.product_id = draft.product_id;
        record.citations = draft.citations;
        for reason in matches.flag_reasons() {
            record.auto_flag(reason);
        }
        if !verdict.is_safe {
            record.auto_flag(verdict.reason.clone().unwrap_or_else(|| "moderation".to_string()));
        }

        let mut action = self
            .reputation
            .action_for(profile.user_id.clone(), ActionKind::ReviewPublished, None)
            .flagged(record.is_flagged);
        if let Some(product_id) = &record.product_id {
            action = action.with_context(product_id.clone());
        }
        record.action_id = Some(action.action_id.clone());

        self.store.insert_content(record.clone(), Some(action)).await?;
        if record.is_flagged {
            info!(
                content = %record.content_id,
                author = %record.author_id,
                reasons = ?record.flag_reasons,
                "Review auto-flagged"
            );
        }

        // The review is durable at this point; a failed refresh is caught
        // up by the next recompute or sweep
        let reputation = match self.reputation.recompute(&profile.user_id).await {
            Ok(status) => status,
            Err(e) => {
                warn!(author = %profile.user_id, error = %e, "Reputation refresh after review failed");
                self.reputation.status(&profile.user_id).await?
            }
        };

        Ok(ReviewReceipt {
            content_id: record.content_id,
            is_flagged: record.is_flagged,
            flag_count: record.flag_count,
            flag_reasons: record.flag_reasons,
            moderation: verdict,
            reputation,
        })
    }

    /// Clear flags on content and restore its reputation credit (admin only)
    pub async fn unflag_content(&self, admin_id: &UserId, content_id: &ContentId) -> Result<UnflagReceipt> {
        self.authorizer.require(admin_id, Capability::UnflagContent).await?;

        let mut content = self
            .store
            .get_content(content_id)
            .await?
            .ok_or_else(|| EngineError::ContentNotFound(content_id.clone()))?;

        if !content.is_flagged {
            return Ok(UnflagReceipt { content, reputation: None });
        }

        content.is_flagged = false;
        content.flag_count = 0;
        content.flag_reasons.clear();
        self.store.update_content(&content).await?;
        info!(content = %content_id, admin = %admin_id, "Content unflagged");

        let reputation = match &content.action_id {
            Some(action_id) => self.reputation.set_action_flag(action_id, false).await?,
            None => None,
        };
        Ok(UnflagReceipt { content, reputation })
    }

    /// Record a qualifying action for an existing member
    pub async fn record_action(
        &self,
        user_id: &UserId,
        kind: ActionKind,
        weight: Option<u32>,
    ) -> Result<ReputationStatus> {
        Ok(self.reputation.on_qualifying_action(user_id, kind, weight).await?)
    }

    /// Record a prepared action, idempotent on its id
    pub async fn record_prepared_action(&self, action: QualifyingAction) -> Result<ReputationStatus> {
        Ok(self.reputation.record_action(action).await?)
    }

    pub async fn recompute(&self, user_id: &UserId) -> Result<ReputationStatus> {
        Ok(self.reputation.recompute(user_id).await?)
    }

    pub async fn status(&self, user_id: &UserId) -> Result<ReputationStatus> {
        Ok(self.reputation.status(user_id).await?)
    }

    /// Submit a vouch; a promotion refreshes the target's badge
    pub async fn submit_vouch(&self, voucher_id: &UserId, target_id: &UserId) -> Result<VouchOutcome> {
        let outcome = self.vouches.submit_vouch(voucher_id, target_id).await?;

        if outcome.promoted {
            if let Err(e) = self.reputation.recompute(target_id).await {
                warn!(target = %target_id, error = %e, "Badge refresh after promotion failed");
            }
        }
        Ok(outcome)
    }

    pub async fn report_spam(
        &self,
        reporter_id: &UserId,
        reported_id: &UserId,
        reason: &str,
    ) -> Result<SpamReportOutcome> {
        Ok(self.spam.report_spam(reporter_id, reported_id, reason).await?)
    }

    /// Lower a member's role (admin only, strictly downward)
    pub async fn demote(&self, admin_id: &UserId, target_id: &UserId, role: Role) -> Result<Profile> {
        self.authorizer.require(admin_id, Capability::DemoteUser).await?;

        let profile = self
            .store
            .get_profile(target_id)
            .await?
            .ok_or_else(|| EngineError::ProfileNotFound(target_id.clone()))?;

        let current = profile.effective_role();
        if role >= current {
            return Err(EngineError::InvalidInput(format!(
                "demotion must lower the role: {} is not below {}",
                role, current
            )));
        }

        self.store.update_role(target_id, role).await?;
        info!(target = %target_id, admin = %admin_id, from = %current, to = %role, "Member demoted");

        // badge follows the new role
        self.reputation.recompute(target_id).await?;
        self.store
            .get_profile(target_id)
            .await?
            .ok_or_else(|| EngineError::ProfileNotFound(target_id.clone()))
    }

    /// Close an expert-review application
    pub async fn resolve_expert_review(&self, actor_id: &UserId, user_id: &UserId) -> Result<Profile> {
        self.authorizer
            .require(actor_id, Capability::ResolveExpertReview)
            .await?;
        Ok(self.reputation.resolve_expert_review(user_id).await?)
    }

    pub async fn authorize(&self, user_id: &UserId, required: Role) -> Result<bool> {
        Ok(self.authorizer.authorize(user_id, required).await?)
    }

    pub async fn has_exact_role(&self, user_id: &UserId, role: Role) -> Result<bool> {
        Ok(self.authorizer.has_exact_role(user_id, role).await?)
    }

    pub async fn authorize_capability(
        &self,
        user_id: &UserId,
        capability: Capability,
    ) -> Result<AuthzDecision> {
        Ok(self.authorizer.authorize_capability(user_id, capability).await?)
    }

    /// Recompute every profile
    pub async fn sweep(&self, concurrency: usize) -> Result<SweepReport> {
        Ok(self.reputation.recompute_all(concurrency).await?)
    }
}
