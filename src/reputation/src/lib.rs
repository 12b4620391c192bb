//! Reputation System for RemedyHub
//!
//! Converts community actions into trust:
//! - **ReputationEngine**: event-sourced score, tier mapping, expert-review flag
//! - **VouchLedger**: peer vouches with atomic promotion at the threshold
//! - **CredibilityScorer**: per-actor factor used to relax moderation
//!
//! ## Tiers
//!
//! | Score | Tier |
//! |-------|------|
//! | < 25  | Member |
//! | ≥ 25  | Contributor |
//! | ≥ 100 | Trusted Reviewer (expert review) |
//! | ≥ 500 | Expert (SME) |

pub mod engine;
pub mod vouch;
pub mod credibility;
pub mod error;
pub mod types;
pub mod metrics;

pub use engine::{ReputationEngine, SweepReport};
pub use vouch::VouchLedger;
pub use credibility::CredibilityScorer;
pub use error::{ReputationError, Result};
pub use types::{
    ActionWeights, CredibilityConfig, ReputationConfig, ReputationStatus, ReputationTier,
    TierThresholds, VouchConfig, VouchOutcome,
};
pub use metrics::{
    TrustMetrics, register_metrics, get_registry, record_recompute,
    record_recompute_failure, record_vouch, record_moderation_verdict,
};
