//! Common types for reputation, vouching, and credibility

use crate::error::{ReputationError, Result};
use remedyhub_core::{ActionKind, BadgeType, Role, UserId};
use serde::{Deserialize, Serialize};

/// Reputation tier, a monotone step function of score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationTier {
    Member,
    Contributor,
    TrustedReviewer,
    Expert,
}

impl ReputationTier {
    /// Numeric tier, starting at 1
    pub fn level(&self) -> u8 {
        match self {
            ReputationTier::Member => 1,
            ReputationTier::Contributor => 2,
            ReputationTier::TrustedReviewer => 3,
            ReputationTier::Expert => 4,
        }
    }

    /// Human-readable tier name
    pub fn name(&self) -> &'static str {
        match self {
            ReputationTier::Member => "Member",
            ReputationTier::Contributor => "Contributor",
            ReputationTier::TrustedReviewer => "Trusted Reviewer",
            ReputationTier::Expert => "Expert",
        }
    }

    /// Badge derived from the tier alone
    pub fn badge(&self) -> BadgeType {
        match self {
            ReputationTier::Member => BadgeType::None,
            ReputationTier::Contributor => BadgeType::Contributor,
            ReputationTier::TrustedReviewer => BadgeType::TrustedReviewer,
            ReputationTier::Expert => BadgeType::Expert,
        }
    }
}

/// Score thresholds separating the tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Below this a member is `Member` (default: 25)
    #[serde(default = "default_contributor")]
    pub contributor: u64,

    /// Crossing this sets `needs_expert_review` (default: 100)
    #[serde(default = "default_expert_review")]
    pub expert_review: u64,

    /// Reaching this counts as SME for read-gating (default: 500)
    #[serde(default = "default_sme")]
    pub sme: u64,
}

fn default_contributor() -> u64 { 25 }
fn default_expert_review() -> u64 { 100 }
fn default_sme() -> u64 { 500 }

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            contributor: default_contributor(),
            expert_review: default_expert_review(),
            sme: default_sme(),
        }
    }
}

impl TierThresholds {
    /// Map a score onto its tier
    pub fn tier_for(&self, score: u64) -> ReputationTier {
        if score >= self.sme {
            ReputationTier::Expert
        } else if score >= self.expert_review {
            ReputationTier::TrustedReviewer
        } else if score >= self.contributor {
            ReputationTier::Contributor
        } else {
            ReputationTier::Member
        }
    }

    /// Thresholds must be strictly increasing and non-zero
    pub fn validate(&self) -> Result<()> {
        if self.contributor == 0 {
            return Err(ReputationError::InvalidConfig(
                "contributor threshold must be positive".to_string(),
            ));
        }
        if !(self.contributor < self.expert_review && self.expert_review < self.sme) {
            return Err(ReputationError::InvalidConfig(format!(
                "thresholds must increase: contributor={} expert_review={} sme={}",
                self.contributor, self.expert_review, self.sme
            )));
        }
        Ok(())
    }
}

/// Points per qualifying action kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionWeights {
    #[serde(default = "default_helpful_vote")]
    pub helpful_vote_received: u32,
    #[serde(default = "default_accepted_answer")]
    pub accepted_answer: u32,
    #[serde(default = "default_review_published")]
    pub review_published: u32,
    #[serde(default = "default_bounty_credit")]
    pub bounty_credit_resolved: u32,
}

fn default_helpful_vote() -> u32 { ActionKind::HelpfulVoteReceived.default_weight() }
fn default_accepted_answer() -> u32 { ActionKind::AcceptedAnswer.default_weight() }
fn default_review_published() -> u32 { ActionKind::ReviewPublished.default_weight() }
fn default_bounty_credit() -> u32 { ActionKind::BountyCreditResolved.default_weight() }

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            helpful_vote_received: default_helpful_vote(),
            accepted_answer: default_accepted_answer(),
            review_published: default_review_published(),
            bounty_credit_resolved: default_bounty_credit(),
        }
    }
}

impl ActionWeights {
    pub fn weight_for(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::HelpfulVoteReceived => self.helpful_vote_received,
            ActionKind::AcceptedAnswer => self.accepted_answer,
            ActionKind::ReviewPublished => self.review_published,
            ActionKind::BountyCreditResolved => self.bounty_credit_resolved,
        }
    }
}

/// Configuration for the reputation engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationConfig {
    #[serde(default)]
    pub thresholds: TierThresholds,

    #[serde(default)]
    pub weights: ActionWeights,
}

/// Configuration for the vouch ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VouchConfig {
    /// Unique vouches needed for promotion (default: 3)
    #[serde(default = "default_promotion_threshold")]
    pub promotion_threshold: u32,

    /// Lowest role allowed to vouch; targets at or above it cannot be vouched for
    #[serde(default = "default_vouch_role")]
    pub min_voucher_role: Role,

    /// Role granted on promotion
    #[serde(default = "default_vouch_role")]
    pub promote_to: Role,
}

fn default_promotion_threshold() -> u32 { 3 }
fn default_vouch_role() -> Role { Role::Sme }

impl Default for VouchConfig {
    fn default() -> Self {
        Self {
            promotion_threshold: default_promotion_threshold(),
            min_voucher_role: default_vouch_role(),
            promote_to: default_vouch_role(),
        }
    }
}

impl VouchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.promotion_threshold == 0 {
            return Err(ReputationError::InvalidConfig(
                "promotion_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for credibility scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityConfig {
    /// Factor for guests and unknown actors (default: 1.0)
    #[serde(default = "default_baseline")]
    pub baseline: f64,

    /// Added per reputation tier above `Member` (default: 0.1)
    #[serde(default = "default_tier_bonus")]
    pub tier_bonus: f64,

    /// Added per unflagged action on the same context (default: 0.05)
    #[serde(default = "default_context_bonus")]
    pub context_bonus_per_action: f64,

    /// Cap on the context bonus (default: 0.25)
    #[serde(default = "default_max_context_bonus")]
    pub max_context_bonus: f64,

    /// Upper bound on the final factor (default: 2.5)
    #[serde(default = "default_max_factor")]
    pub max_factor: f64,
}

fn default_baseline() -> f64 { 1.0 }
fn default_tier_bonus() -> f64 { 0.1 }
fn default_context_bonus() -> f64 { 0.05 }
fn default_max_context_bonus() -> f64 { 0.25 }
fn default_max_factor() -> f64 { 2.5 }

impl Default for CredibilityConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            tier_bonus: default_tier_bonus(),
            context_bonus_per_action: default_context_bonus(),
            max_context_bonus: default_max_context_bonus(),
            max_factor: default_max_factor(),
        }
    }
}

impl CredibilityConfig {
    /// Base factor earned by role alone
    pub fn role_factor(&self, role: Role) -> f64 {
        match role {
            Role::Standard | Role::BusinessUser => self.baseline,
            Role::Sme => self.baseline + 0.5,
            Role::SmeAdmin => self.baseline + 0.75,
            Role::Admin => self.baseline + 1.0,
        }
    }
}

/// Result of a recomputation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationStatus {
    pub user_id: UserId,
    pub score: u64,
    pub tier: ReputationTier,
    pub tier_name: String,
    pub badge: BadgeType,
    pub needs_expert_review: bool,
    pub is_sme: bool,
}

/// Response to a vouch submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VouchOutcome {
    pub accepted: bool,
    pub vouch_count: u32,
    pub promoted: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_mapping_is_monotone() {
        let thresholds = TierThresholds::default();
        let mut previous = ReputationTier::Member;
        for score in 0..1_000u64 {
            let tier = thresholds.tier_for(score);
            assert!(tier >= previous, "tier dropped at score {}", score);
            previous = tier;
        }
    }

    #[test]
    fn test_tier_boundaries() {
        let thresholds = TierThresholds::default();
        assert_eq!(thresholds.tier_for(0), ReputationTier::Member);
        assert_eq!(thresholds.tier_for(24), ReputationTier::Member);
        assert_eq!(thresholds.tier_for(25), ReputationTier::Contributor);
        assert_eq!(thresholds.tier_for(100), ReputationTier::TrustedReviewer);
        assert_eq!(thresholds.tier_for(500), ReputationTier::Expert);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(TierThresholds::default().validate().is_ok());

        let inverted = TierThresholds { contributor: 10, expert_review: 5, sme: 50 };
        assert!(inverted.validate().is_err());

        let zero = TierThresholds { contributor: 0, ..Default::default() };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_default_weights_match_kinds() {
        let weights = ActionWeights::default();
        for kind in ActionKind::ALL {
            assert_eq!(weights.weight_for(kind), kind.default_weight());
        }
    }
}
