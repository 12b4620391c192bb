//! Moderation Gateway
//!
//! Turns a classifier call into an admission verdict.
//!
//! Fail-closed: if the service cannot produce a classification (timeout,
//! network failure, missing credential, bad status, bad body) the content
//! is not safe. This holds for every actor, admins included.
//!
//! Credibility relaxation: a flagged classification is admitted for a known
//! actor whose credibility factor exceeds the baseline, when its confidence
//! stays below `min(block_confidence * factor, max_relaxed_confidence)` and
//! none of its categories is hard-blocked. Guests are never relaxed.

use crate::client::{ActorContext, Classification, ModerationClient};
use remedyhub_core::UserId;
use remedyhub_reputation::{record_moderation_verdict, CredibilityScorer, TrustMetrics};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Admission decision for one piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub is_safe: bool,
    pub reason: Option<String>,
    pub confidence: f64,
    pub credibility_adjusted: bool,
}

impl ModerationVerdict {
    fn safe(confidence: f64) -> Self {
        Self {
            is_safe: true,
            reason: None,
            confidence,
            credibility_adjusted: false,
        }
    }

    fn blocked(reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            is_safe: false,
            reason: Some(reason.into()),
            confidence,
            credibility_adjusted: false,
        }
    }
}

/// Relaxation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationPolicy {
    /// Confidence at which a flagged item is blocked for a baseline actor (default: 0.5)
    #[serde(default = "default_block_confidence")]
    pub block_confidence: f64,

    /// Ceiling for the relaxed threshold (default: 0.95)
    #[serde(default = "default_max_relaxed_confidence")]
    pub max_relaxed_confidence: f64,

    /// Categories never relaxed, whatever the actor's credibility
    #[serde(default = "default_hard_block_categories")]
    pub hard_block_categories: Vec<String>,
}

fn default_block_confidence() -> f64 { 0.5 }
fn default_max_relaxed_confidence() -> f64 { 0.95 }
fn default_hard_block_categories() -> Vec<String> {
    ["self-harm", "sexual/minors", "violence/graphic", "hate/threatening"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self {
            block_confidence: default_block_confidence(),
            max_relaxed_confidence: default_max_relaxed_confidence(),
            hard_block_categories: default_hard_block_categories(),
        }
    }
}

impl ModerationPolicy {
    /// Confidence below which a flagged item is relaxed for `factor`
    pub fn relaxed_threshold(&self, factor: f64) -> f64 {
        (self.block_confidence * factor).min(self.max_relaxed_confidence)
    }

    pub fn is_hard_blocked(&self, category: &str) -> bool {
        self.hard_block_categories
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(category))
    }
}

pub struct ModerationGateway {
    client: Arc<dyn ModerationClient>,
    scorer: CredibilityScorer,
    policy: ModerationPolicy,
    metrics: Option<Arc<TrustMetrics>>,
}

impl ModerationGateway {
    pub fn new(client: Arc<dyn ModerationClient>, scorer: CredibilityScorer, policy: ModerationPolicy) -> Self {
        Self {
            client,
            scorer,
            policy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<TrustMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> &ModerationPolicy {
        &self.policy
    }

    /// Moderate content from an actor, or from a guest when `actor` is `None`
    pub async fn moderate(&self, content: &str, actor: Option<&UserId>) -> ModerationVerdict {
        self.moderate_in_context(content, actor, None).await
    }

    /// Like [`ModerationGateway::moderate`], scoring credibility against a
    /// context such as the reviewed product
    pub async fn moderate_in_context(
        &self,
        content: &str,
        actor: Option<&UserId>,
        context_id: Option<&str>,
    ) -> ModerationVerdict {
        let actor_context = match actor.filter(|id| !id.is_blank()) {
            Some(user_id) => {
                let factor = self.scorer.score_or_baseline(user_id, context_id).await;
                ActorContext::member(user_id.clone(), factor, context_id.map(str::to_string))
            }
            None => ActorContext::guest(self.scorer.baseline()),
        };

        let verdict = match self.client.classify(content, &actor_context).await {
            Ok(classification) => self.decide(&classification, &actor_context),
            Err(e) => {
                let reason = e.verdict_reason();
                warn!(
                    actor = ?actor_context.user_id,
                    error = %e,
                    reason,
                    "Moderation failed, holding content"
                );
                ModerationVerdict::blocked(reason, 0.0)
            }
        };

        if let Some(metrics) = &self.metrics {
            let outcome = match (&verdict.reason, verdict.is_safe) {
                (_, true) => "safe",
                (Some(reason), false) if reason == "moderation_unavailable" => "unavailable",
                (Some(reason), false) if reason == "moderation_error" => "error",
                _ => "flagged",
            };
            record_moderation_verdict(metrics, outcome, verdict.credibility_adjusted);
        }
        verdict
    }

    fn decide(&self, classification: &Classification, actor: &ActorContext) -> ModerationVerdict {
        if !classification.flagged {
            return ModerationVerdict::safe(classification.confidence);
        }

        let reason = if classification.categories.is_empty() {
            "flagged".to_string()
        } else {
            format!("flagged: {}", classification.categories.join(", "))
        };

        if actor.is_guest() || actor.credibility <= self.scorer.baseline() {
            debug!(reason = %reason, "Flagged content held");
            return ModerationVerdict::blocked(reason, classification.confidence);
        }

        let hard_blocked = classification
            .categories
            .iter()
            .any(|c| self.policy.is_hard_blocked(c));
        let threshold = self.policy.relaxed_threshold(actor.credibility);

        if !hard_blocked && classification.confidence < threshold {
            info!(
                actor = ?actor.user_id,
                credibility = actor.credibility,
                confidence = classification.confidence,
                threshold,
                "Flagged content admitted on credibility"
            );
            return ModerationVerdict {
                is_safe: true,
                reason: Some(reason),
                confidence: classification.confidence,
                credibility_adjusted: true,
            };
        }

        ModerationVerdict::blocked(reason, classification.confidence)
    }
}
