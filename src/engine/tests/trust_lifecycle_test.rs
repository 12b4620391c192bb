//! End-to-end trust lifecycle through the engine facade

use async_trait::async_trait;
use remedyhub_authz::{AuthzError, Capability};
use remedyhub_core::{
    ActionKind, ActionLog, BadgeType, ContentStore, InMemoryTrustStore, Profile, ProfileStore,
    Role, UserId, VouchRecord, VouchStore,
};
use remedyhub_engine::{EngineConfig, EngineError, Identity, ReviewDraft, TrustEngine};
use remedyhub_moderation::{
    ActorContext, Classification, ModerationClient, ModerationError, StaticKeywordSource,
};
use remedyhub_reputation::{ReputationError, TrustMetrics};
use std::sync::Arc;

// ============================================================================
// HELPERS
// ============================================================================

struct CleanClassifier;

#[async_trait]
impl ModerationClient for CleanClassifier {
    async fn classify(
        &self,
        _text: &str,
        _actor: &ActorContext,
    ) -> remedyhub_moderation::Result<Classification> {
        Ok(Classification::clean())
    }
}

struct DownClassifier;

#[async_trait]
impl ModerationClient for DownClassifier {
    async fn classify(
        &self,
        _text: &str,
        _actor: &ActorContext,
    ) -> remedyhub_moderation::Result<Classification> {
        Err(ModerationError::Unavailable("connection refused".into()))
    }
}

fn engine_with(store: &InMemoryTrustStore, classifier: Arc<dyn ModerationClient>) -> TrustEngine {
    let keywords = StaticKeywordSource::new(vec!["miracle cure".into(), "guaranteed results".into()]);
    TrustEngine::new(
        Arc::new(store.clone()),
        classifier,
        Arc::new(keywords),
        &EngineConfig::default(),
    )
}

fn engine(store: &InMemoryTrustStore) -> TrustEngine {
    engine_with(store, Arc::new(CleanClassifier))
}

async fn seed(store: &InMemoryTrustStore, user: &str, role: Role) -> UserId {
    let id = UserId::new(user);
    store
        .insert_profile_if_absent(Profile::new(id.clone()).with_role(role))
        .await
        .unwrap();
    id
}

fn review(body: &str) -> ReviewDraft {
    ReviewDraft {
        product_id: Some("magnesium-glycinate".into()),
        body: body.into(),
        citations: vec!["https://pubmed.ncbi.nlm.nih.gov/12345/".into()],
    }
}

// ============================================================================
// CONTENT ADMISSION
// ============================================================================

#[tokio::test]
async fn test_clean_review_is_visible_and_counts() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);

    let receipt = engine
        .submit_review(&Identity::new("alice"), review("Helped my sleep within a week."))
        .await
        .unwrap();

    assert!(!receipt.is_flagged);
    assert_eq!(receipt.flag_count, 0);
    assert!(receipt.moderation.is_safe);
    assert_eq!(receipt.reputation.score, 10);

    let profile = store.get_profile(&UserId::new("alice")).await.unwrap().unwrap();
    assert_eq!(profile.effective_role(), Role::Standard);
}

#[tokio::test]
async fn test_blacklisted_review_flagged_until_unflagged() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let admin = seed(&store, "admin", Role::Admin).await;

    let receipt = engine
        .submit_review(
            &Identity::new("bob"),
            review("This is a MIRACLE CURE for everything, otherwise well sourced."),
        )
        .await
        .unwrap();

    assert!(receipt.is_flagged);
    assert_eq!(receipt.flag_count, 1);
    assert_eq!(receipt.reputation.score, 0);

    let stored = store.get_content(&receipt.content_id).await.unwrap().unwrap();
    assert!(stored.is_flagged);
    assert_eq!(stored.flag_count, 1);
    assert!(!stored.is_visible());

    let unflagged = engine.unflag_content(&admin, &receipt.content_id).await.unwrap();
    assert!(!unflagged.content.is_flagged);
    assert_eq!(unflagged.reputation.unwrap().score, 10);
}

#[tokio::test]
async fn test_unflag_requires_admin() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let sme = seed(&store, "sme", Role::SmeAdmin).await;

    let receipt = engine
        .submit_review(&Identity::new("bob"), review("guaranteed results"))
        .await
        .unwrap();

    let err = engine.unflag_content(&sme, &receipt.content_id).await.unwrap_err();
    assert!(matches!(err, EngineError::Authz(AuthzError::Forbidden { .. })));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_moderation_outage_holds_review_even_for_admin() {
    let store = InMemoryTrustStore::new();
    let engine = engine_with(&store, Arc::new(DownClassifier));
    seed(&store, "admin", Role::Admin).await;

    let receipt = engine
        .submit_review(&Identity::new("admin"), review("Plain, well cited review."))
        .await
        .unwrap();

    assert!(receipt.is_flagged);
    assert!(!receipt.moderation.is_safe);
    assert_eq!(receipt.moderation.reason.as_deref(), Some("moderation_unavailable"));
    assert_eq!(receipt.flag_reasons, vec!["moderation_unavailable".to_string()]);
    assert_eq!(receipt.reputation.score, 0);
}

#[tokio::test]
async fn test_invalid_citation_rejects_review() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);

    let mut draft = review("Sourced from a trustworthy journal.");
    draft.citations.push("https://nature.com.evil.com/paper".into());

    let err = engine.submit_review(&Identity::new("carol"), draft).await.unwrap_err();
    match err {
        EngineError::InvalidCitation { citation, reason } => {
            assert_eq!(citation, "https://nature.com.evil.com/paper");
            assert!(reason.contains("nature.com.evil.com"));
        }
        other => panic!("unexpected error: {}", other),
    }

    let status = engine.status(&UserId::new("carol")).await.unwrap();
    assert_eq!(status.score, 0);
}

#[tokio::test]
async fn test_action_log_outage_stores_nothing() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let author = Identity::new("frida");

    store.set_action_log_available(false);
    let err = engine
        .submit_review(&author, review("Solid evidence, modest effect."))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));
    assert!(!err.is_client_error());

    store.set_action_log_available(true);
    assert!(store.content_by_author(&author.user_id).await.unwrap().is_empty());
    assert!(store.actions_for(&author.user_id).await.unwrap().is_empty());

    // a retry after recovery stores exactly one review with its credit
    let receipt = engine
        .submit_review(&author, review("Solid evidence, modest effect."))
        .await
        .unwrap();
    assert_eq!(receipt.reputation.score, 10);
    assert_eq!(store.content_by_author(&author.user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_review_rejected() {
    let store = InMemoryTrustStore::new();
    let err = engine(&store)
        .submit_review(&Identity::new("dan"), review("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

// ============================================================================
// VOUCHING
// ============================================================================

#[tokio::test]
async fn test_third_vouch_from_sme_admin_promotes() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let target = seed(&store, "erin", Role::Standard).await;
    let sme_admin = seed(&store, "dr-sme-admin", Role::SmeAdmin).await;

    // two earlier vouches already on record
    for voucher in ["sme-1", "sme-2"] {
        let voucher = seed(&store, voucher, Role::Sme).await;
        store
            .insert_vouch(VouchRecord::new(voucher, target.clone()), 3, Role::Sme)
            .await
            .unwrap();
    }
    assert_eq!(store.vouch_count(&target).await.unwrap(), 2);

    let outcome = engine.submit_vouch(&sme_admin, &target).await.unwrap();
    assert!(outcome.accepted);
    assert_eq!(outcome.vouch_count, 3);
    assert!(outcome.promoted);

    let profile = store.get_profile(&target).await.unwrap().unwrap();
    assert_eq!(profile.effective_role(), Role::Sme);
    assert_eq!(profile.vouch_count, 3);
    assert_eq!(profile.badge, BadgeType::Expert);
    assert!(engine.authorize(&target, Role::Sme).await.unwrap());
}

#[tokio::test]
async fn test_repeat_vouch_is_benign() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let target = seed(&store, "erin", Role::Standard).await;
    let sme = seed(&store, "sme", Role::Sme).await;

    engine.submit_vouch(&sme, &target).await.unwrap();
    let again = engine.submit_vouch(&sme, &target).await.unwrap();

    assert!(!again.accepted);
    assert!(!again.promoted);
    assert_eq!(again.vouch_count, 1);
}

#[tokio::test]
async fn test_standard_member_cannot_vouch() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let target = seed(&store, "erin", Role::Standard).await;
    let member = seed(&store, "frank", Role::Standard).await;

    let err = engine.submit_vouch(&member, &target).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Reputation(ReputationError::InsufficientRole { .. })
    ));
}

// ============================================================================
// STAFF ACTIONS
// ============================================================================

#[tokio::test]
async fn test_demotion_is_admin_only_and_downward() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let admin = seed(&store, "admin", Role::Admin).await;
    let sme = seed(&store, "sme", Role::Sme).await;

    let err = engine.demote(&sme, &admin, Role::Standard).await.unwrap_err();
    assert!(matches!(err, EngineError::Authz(_)));

    let err = engine.demote(&admin, &sme, Role::SmeAdmin).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let demoted = engine.demote(&admin, &sme, Role::Standard).await.unwrap();
    assert_eq!(demoted.effective_role(), Role::Standard);
    assert_eq!(demoted.badge, BadgeType::None);
}

#[tokio::test]
async fn test_demotion_keeps_vouch_and_reputation_state() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let admin = seed(&store, "admin", Role::Admin).await;
    let member = seed(&store, "brand-rep", Role::BusinessUser).await;
    let sme = seed(&store, "sme", Role::Sme).await;

    engine.submit_vouch(&sme, &member).await.unwrap();
    engine
        .record_action(&member, ActionKind::BountyCreditResolved, Some(120))
        .await
        .unwrap();

    let demoted = engine.demote(&admin, &member, Role::Standard).await.unwrap();

    assert_eq!(demoted.effective_role(), Role::Standard);
    assert_eq!(demoted.vouch_count, store.vouch_count(&member).await.unwrap());
    assert_eq!(demoted.vouch_count, 1);
    assert_eq!(demoted.reputation_score, 120);
    assert!(demoted.needs_expert_review);
}

#[tokio::test]
async fn test_expert_review_flag_and_resolution() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let member = seed(&store, "gina", Role::Standard).await;
    let reviewer = seed(&store, "dr-reviewer", Role::SmeAdmin).await;

    let status = engine
        .record_action(&member, ActionKind::BountyCreditResolved, Some(100))
        .await
        .unwrap();
    assert!(status.needs_expert_review);

    let err = engine.resolve_expert_review(&member, &member).await.unwrap_err();
    assert!(matches!(err, EngineError::Authz(_)));

    let profile = engine.resolve_expert_review(&reviewer, &member).await.unwrap();
    assert!(!profile.needs_expert_review);
    assert_eq!(profile.effective_role(), Role::Standard);
}

#[tokio::test]
async fn test_spam_reports_and_capability_checks() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let reporter = seed(&store, "helen", Role::Standard).await;
    let spammer = seed(&store, "spammer", Role::Standard).await;

    let first = engine.report_spam(&reporter, &spammer, "affiliate links").await.unwrap();
    let again = engine.report_spam(&reporter, &spammer, "affiliate links").await.unwrap();
    assert!(!first.duplicate);
    assert!(again.duplicate && again.success);
    assert_eq!(again.distinct_reporters, 1);

    let decision = engine
        .authorize_capability(&reporter, Capability::ViewSpamReports)
        .await
        .unwrap();
    assert!(!decision.allowed);
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let store = InMemoryTrustStore::new();
    let engine = engine(&store);
    let identity = Identity {
        user_id: UserId::new("ivy"),
        display_name: Some("Ivy".into()),
        email_verified: true,
    };

    let first = engine.bootstrap_profile(&identity).await.unwrap();
    engine
        .record_action(&identity.user_id, ActionKind::AcceptedAnswer, None)
        .await
        .unwrap();
    let second = engine.bootstrap_profile(&identity).await.unwrap();

    assert_eq!(first.reputation_score, 0);
    assert_eq!(second.reputation_score, 15);
    assert_eq!(second.display_name.as_deref(), Some("Ivy"));
    assert!(engine.bootstrap_profile(&Identity::new("")).await.is_err());
}

#[tokio::test]
async fn test_sweep_with_metrics() {
    let store = InMemoryTrustStore::new();
    let registry = prometheus::Registry::new();
    let metrics = Arc::new(TrustMetrics::new(&registry).unwrap());
    let engine = engine(&store).with_metrics(metrics.clone());

    for user in ["a", "b", "c"] {
        seed(&store, user, Role::Standard).await;
    }
    let report = engine.sweep(2).await.unwrap();

    assert_eq!(report.recomputed, 3);
    assert_eq!(metrics.recomputations_total.get(), 3);
}
