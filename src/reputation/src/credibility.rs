//! Credibility scoring for moderation relaxation
//!
//! The factor starts from the actor's role, adds a bonus per reputation
//! tier, and a capped bonus for unflagged history on the same context
//! (usually a product id). Banned actors score zero. Unknown actors and
//! store failures get the baseline, which never relaxes anything.

use crate::error::Result;
use crate::types::{CredibilityConfig, TierThresholds};
use remedyhub_core::{ActionLog, ProfileStore, TrustStore, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct CredibilityScorer {
    store: Arc<dyn TrustStore>,
    config: CredibilityConfig,
    thresholds: TierThresholds,
}

impl CredibilityScorer {
    pub fn new(store: Arc<dyn TrustStore>, config: CredibilityConfig, thresholds: TierThresholds) -> Self {
        Self {
            store,
            config,
            thresholds,
        }
    }

    /// Factor for guests and unknown actors
    pub fn baseline(&self) -> f64 {
        self.config.baseline
    }

    /// Credibility factor for an actor, optionally scoped to a context id.
    ///
    /// Store errors are returned; callers that must not fail use
    /// [`CredibilityScorer::score_or_baseline`].
    pub async fn score(&self, user_id: &UserId, context_id: Option<&str>) -> Result<f64> {
        let profile = match self.store.get_profile(user_id).await? {
            Some(profile) => profile,
            None => return Ok(self.config.baseline),
        };
        if profile.is_banned {
            return Ok(0.0);
        }

        let tier = self.thresholds.tier_for(profile.reputation_score);
        let mut factor = self.config.role_factor(profile.effective_role())
            + self.config.tier_bonus * f64::from(tier.level() - 1);

        if let Some(context) = context_id {
            let on_context = self
                .store
                .actions_for(user_id)
                .await?
                .iter()
                .filter(|a| !a.flagged && a.context_id.as_deref() == Some(context))
                .count();
            let bonus = self.config.context_bonus_per_action * on_context as f64;
            factor += bonus.min(self.config.max_context_bonus);
        }

        let factor = factor.clamp(0.0, self.config.max_factor);
        debug!(user = %user_id, factor, "Credibility scored");
        Ok(factor)
    }

    /// Like [`CredibilityScorer::score`], degrading to the baseline on error
    pub async fn score_or_baseline(&self, user_id: &UserId, context_id: Option<&str>) -> f64 {
        match self.score(user_id, context_id).await {
            Ok(factor) => factor,
            Err(e) => {
                warn!(user = %user_id, error = %e, "Credibility unavailable, using baseline");
                self.config.baseline
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedyhub_core::{ActionKind, InMemoryTrustStore, Profile, QualifyingAction, Role};

    fn scorer(store: &InMemoryTrustStore) -> CredibilityScorer {
        CredibilityScorer::new(
            Arc::new(store.clone()),
            CredibilityConfig::default(),
            TierThresholds::default(),
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[tokio::test]
    async fn test_unknown_actor_gets_baseline() {
        let store = InMemoryTrustStore::new();
        let factor = scorer(&store).score(&UserId::new("ghost"), None).await.unwrap();
        assert!(approx(factor, 1.0));
    }

    #[tokio::test]
    async fn test_role_and_tier_raise_factor() {
        let store = InMemoryTrustStore::new();
        let mut sme = Profile::new(UserId::new("sme")).with_role(Role::Sme);
        sme.reputation_score = 120;
        store.insert_profile_if_absent(sme).await.unwrap();
        store
            .insert_profile_if_absent(Profile::new(UserId::new("new")))
            .await
            .unwrap();

        let scorer = scorer(&store);
        let newcomer = scorer.score(&UserId::new("new"), None).await.unwrap();
        let expert = scorer.score(&UserId::new("sme"), None).await.unwrap();

        assert!(approx(newcomer, 1.0));
        // role bonus 0.5 plus two tiers above Member
        assert!(approx(expert, 1.7));
    }

    #[tokio::test]
    async fn test_context_bonus_is_capped_and_ignores_flagged() {
        let store = InMemoryTrustStore::new();
        let alice = UserId::new("alice");
        store.insert_profile_if_absent(Profile::new(alice.clone())).await.unwrap();
        for _ in 0..10 {
            store
                .append_action(
                    QualifyingAction::new(alice.clone(), ActionKind::ReviewPublished)
                        .with_context("product-7"),
                )
                .await
                .unwrap();
        }
        store
            .append_action(
                QualifyingAction::new(alice.clone(), ActionKind::ReviewPublished)
                    .with_context("product-8")
                    .flagged(true),
            )
            .await
            .unwrap();

        let scorer = scorer(&store);
        let capped = scorer.score(&alice, Some("product-7")).await.unwrap();
        let flagged_only = scorer.score(&alice, Some("product-8")).await.unwrap();

        assert!(approx(capped, 1.25));
        assert!(approx(flagged_only, 1.0));
    }

    #[tokio::test]
    async fn test_banned_actor_scores_zero() {
        let store = InMemoryTrustStore::new();
        let mut banned = Profile::new(UserId::new("spammer")).with_role(Role::Admin);
        banned.is_banned = true;
        store.insert_profile_if_absent(banned).await.unwrap();

        let factor = scorer(&store).score(&UserId::new("spammer"), None).await.unwrap();
        assert_eq!(factor, 0.0);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_baseline() {
        let store = InMemoryTrustStore::new();
        store
            .insert_profile_if_absent(Profile::new(UserId::new("alice")).with_role(Role::Admin))
            .await
            .unwrap();
        store.set_action_log_available(false);

        let scorer = scorer(&store);
        assert!(scorer.score(&UserId::new("alice"), Some("p")).await.is_err());
        let factor = scorer.score_or_baseline(&UserId::new("alice"), Some("p")).await;
        assert!(approx(factor, 1.0));
    }
}
