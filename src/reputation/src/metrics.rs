//! Prometheus Metrics for the Trust Engine
//!
//! Metrics collection for monitoring trust decisions:
//! - **Reputation Metrics**: Recomputations, failures, score distribution, tiers
//! - **Vouch Metrics**: Submissions by outcome and promotions
//! - **Moderation Metrics**: Verdicts by reason, credibility relaxations
//!
//! All metrics are exposed in Prometheus format through the shared registry.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Histogram, HistogramOpts, IntCounter, IntCounterVec,
    Opts, Registry,
};
use std::sync::Arc;
use lazy_static::lazy_static;
use parking_lot::RwLock;

/// Histogram buckets for reputation scores, aligned with default tier thresholds
const REPUTATION_SCORE_BUCKETS: &[f64] = &[
    0.0,
    25.0,     // contributor
    100.0,    // expert review
    250.0,
    500.0,    // sme
    1000.0,
    2500.0,
];

lazy_static! {
    /// Global metrics registry shared across all trust components
    static ref METRICS_REGISTRY: Arc<RwLock<Option<Registry>>> = Arc::new(RwLock::new(None));
}

/// Metrics for reputation, vouching, and moderation
pub struct TrustMetrics {
    // === REPUTATION METRICS ===

    /// Successful recomputations (Counter)
    pub recomputations_total: IntCounter,

    /// Recomputations aborted because the history was unreachable (Counter)
    pub recompute_failures_total: IntCounter,

    /// Distribution of recomputed scores (Histogram)
    pub reputation_score_distribution: Histogram,

    /// Expert-review flags raised by threshold crossings (Counter)
    pub expert_review_flags_total: IntCounter,

    // === VOUCH METRICS ===

    /// Vouch submissions by outcome (Counter)
    pub vouches_total: IntCounterVec,

    /// Promotions triggered by the vouch threshold (Counter)
    pub vouch_promotions_total: IntCounter,

    // === MODERATION METRICS ===

    /// Moderation verdicts by outcome/reason (Counter)
    pub moderation_verdicts_total: IntCounterVec,

    /// Flagged verdicts admitted because of author credibility (Counter)
    pub credibility_relaxations_total: IntCounter,
}

impl TrustMetrics {
    /// Create and register all metrics on the given registry
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let recomputations_total = register_int_counter_with_registry!(
            Opts::new("remedyhub_reputation_recomputations_total", "Successful reputation recomputations"),
            registry
        )?;

        let recompute_failures_total = register_int_counter_with_registry!(
            Opts::new("remedyhub_reputation_recompute_failures_total", "Recomputations aborted on unreachable history"),
            registry
        )?;

        let reputation_score_distribution = register_histogram_with_registry!(
            HistogramOpts::new("remedyhub_reputation_score_distribution", "Distribution of recomputed reputation scores")
                .buckets(REPUTATION_SCORE_BUCKETS.to_vec()),
            registry
        )?;

        let expert_review_flags_total = register_int_counter_with_registry!(
            Opts::new("remedyhub_reputation_expert_review_flags_total", "Expert review flags raised by threshold crossings"),
            registry
        )?;

        let vouches_total = register_int_counter_vec_with_registry!(
            Opts::new("remedyhub_vouches_total", "Vouch submissions by outcome"),
            &["outcome"],
            registry
        )?;

        let vouch_promotions_total = register_int_counter_with_registry!(
            Opts::new("remedyhub_vouch_promotions_total", "Promotions triggered by the vouch threshold"),
            registry
        )?;

        let moderation_verdicts_total = register_int_counter_vec_with_registry!(
            Opts::new("remedyhub_moderation_verdicts_total", "Moderation verdicts by outcome"),
            &["outcome"],
            registry
        )?;

        let credibility_relaxations_total = register_int_counter_with_registry!(
            Opts::new("remedyhub_moderation_credibility_relaxations_total", "Flagged verdicts admitted due to credibility"),
            registry
        )?;

        Ok(Self {
            recomputations_total,
            recompute_failures_total,
            reputation_score_distribution,
            expert_review_flags_total,
            vouches_total,
            vouch_promotions_total,
            moderation_verdicts_total,
            credibility_relaxations_total,
        })
    }
}

/// Initialize the global metrics registry
///
/// Call once during startup. Calling it twice fails with a duplicate
/// registration error from prometheus.
pub fn register_metrics() -> Result<Arc<TrustMetrics>, prometheus::Error> {
    let mut registry_lock = METRICS_REGISTRY.write();

    // Create new registry if not already initialized
    let registry = registry_lock.get_or_insert_with(Registry::new);

    let metrics = TrustMetrics::new(registry)?;

    Ok(Arc::new(metrics))
}

/// Get the global metrics registry
pub fn get_registry() -> Option<Registry> {
    METRICS_REGISTRY.read().clone()
}

/// Record a completed recomputation
pub fn record_recompute(metrics: &TrustMetrics, score: u64) {
    metrics.recomputations_total.inc();
    metrics.reputation_score_distribution.observe(score as f64);
}

/// Record a recomputation aborted by a history failure
pub fn record_recompute_failure(metrics: &TrustMetrics) {
    metrics.recompute_failures_total.inc();
}

/// Record a vouch submission outcome ("accepted", "duplicate", "rejected")
pub fn record_vouch(metrics: &TrustMetrics, outcome: &str, promoted: bool) {
    metrics.vouches_total.with_label_values(&[outcome]).inc();
    if promoted {
        metrics.vouch_promotions_total.inc();
    }
}

/// Record a moderation verdict ("safe", "flagged", or a failure reason)
pub fn record_moderation_verdict(metrics: &TrustMetrics, outcome: &str, credibility_adjusted: bool) {
    metrics.moderation_verdicts_total.with_label_values(&[outcome]).inc();
    if credibility_adjusted {
        metrics.credibility_relaxations_total.inc();
    }
}
