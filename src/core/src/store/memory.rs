//! In-memory trust store
//!
//! All tables live behind one lock, so every trait method is a single
//! critical section. That is what makes `insert_vouch`, `apply_reputation`
//! and `insert_content` atomic here.

use crate::error::{CoreError, Result};
use crate::traits::{
    ActionLog, ContentStore, ProfileStore, ReportInsert, ReputationChange, ReputationUpdate,
    SpamReportStore, VouchInsert, VouchStore,
};
use crate::types::{
    ActionId, ContentId, ContentRecord, Profile, QualifyingAction, Role, SpamReport, UserId,
    VouchRecord,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Tables {
    profiles: HashMap<UserId, Profile>,
    actions: Vec<QualifyingAction>,
    action_ids: HashSet<ActionId>,
    vouches: Vec<VouchRecord>,
    vouch_pairs: HashSet<(UserId, UserId)>,
    reports: Vec<SpamReport>,
    report_pairs: HashSet<(UserId, UserId)>,
    content: HashMap<ContentId, ContentRecord>,
}

impl Tables {
    fn vouch_count(&self, target_id: &UserId) -> u32 {
        self.vouches.iter().filter(|v| &v.target_id == target_id).count() as u32
    }

    fn actions_for(&self, user_id: &UserId) -> Vec<QualifyingAction> {
        self.actions
            .iter()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect()
    }

    fn distinct_reporters(&self, reported_id: &UserId) -> u32 {
        self.report_pairs
            .iter()
            .filter(|(_, reported)| reported == reported_id)
            .count() as u32
    }
}

/// In-memory implementation of every store trait
#[derive(Clone, Default)]
pub struct InMemoryTrustStore {
    tables: Arc<RwLock<Tables>>,
    action_log_offline: Arc<AtomicBool>,
}

impl InMemoryTrustStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an action-log outage; reads and writes fail while offline
    pub fn set_action_log_available(&self, available: bool) {
        self.action_log_offline.store(!available, Ordering::SeqCst);
    }

    fn check_action_log(&self) -> Result<()> {
        if self.action_log_offline.load(Ordering::SeqCst) {
            return Err(CoreError::store("action log unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryTrustStore {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(user_id).cloned())
    }

    async fn insert_profile_if_absent(&self, profile: Profile) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .profiles
            .entry(profile.user_id.clone())
            .or_insert(profile);
        Ok(stored.clone())
    }

    async fn update_role(&self, user_id: &UserId, role: Role) -> Result<()> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| CoreError::not_found(format!("profile {}", user_id)))?;
        profile.role = Some(role);
        profile.touch();
        Ok(())
    }

    async fn list_user_ids(&self) -> Result<Vec<UserId>> {
        let tables = self.tables.read().await;
        let mut ids: Vec<UserId> = tables.profiles.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl ActionLog for InMemoryTrustStore {
    async fn append_action(&self, action: QualifyingAction) -> Result<bool> {
        self.check_action_log()?;
        let mut tables = self.tables.write().await;
        if !tables.action_ids.insert(action.action_id.clone()) {
            debug!("Action {} already logged", action.action_id);
            return Ok(false);
        }
        tables.actions.push(action);
        Ok(true)
    }

    async fn actions_for(&self, user_id: &UserId) -> Result<Vec<QualifyingAction>> {
        self.check_action_log()?;
        let tables = self.tables.read().await;
        Ok(tables.actions_for(user_id))
    }

    async fn set_action_flag(&self, action_id: &ActionId, flagged: bool) -> Result<Option<UserId>> {
        self.check_action_log()?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .actions
            .iter_mut()
            .find(|a| &a.action_id == action_id)
            .map(|action| {
                action.flagged = flagged;
                action.user_id.clone()
            }))
    }

    async fn apply_reputation(
        &self,
        user_id: &UserId,
        fold: &(dyn for<'p, 'a> Fn(&'p Profile, &'a [QualifyingAction]) -> ReputationUpdate + Send + Sync),
    ) -> Result<Option<ReputationChange>> {
        self.check_action_log()?;
        let mut tables = self.tables.write().await;
        let actions = tables.actions_for(user_id);

        let profile = match tables.profiles.get_mut(user_id) {
            Some(profile) => profile,
            None => return Ok(None),
        };
        let previous = profile.clone();
        fold(&previous, &actions).apply_to(profile);

        Ok(Some(ReputationChange {
            previous,
            current: profile.clone(),
        }))
    }
}

#[async_trait]
impl VouchStore for InMemoryTrustStore {
    async fn insert_vouch(
        &self,
        record: VouchRecord,
        threshold: u32,
        promote_to: Role,
    ) -> Result<VouchInsert> {
        let mut tables = self.tables.write().await;
        let pair = (record.voucher_id.clone(), record.target_id.clone());
        let target_id = record.target_id.clone();

        if tables.vouch_pairs.contains(&pair) {
            let vouch_count = tables.vouch_count(&target_id);
            return Ok(VouchInsert::Duplicate { vouch_count });
        }

        if !tables.profiles.contains_key(&target_id) {
            return Err(CoreError::not_found(format!("profile {}", target_id)));
        }

        tables.vouch_pairs.insert(pair);
        tables.vouches.push(record);
        let vouch_count = tables.vouch_count(&target_id);

        let mut promoted = false;
        if let Some(profile) = tables.profiles.get_mut(&target_id) {
            profile.vouch_count = vouch_count;
            if vouch_count == threshold && profile.effective_role() < promote_to {
                profile.role = Some(promote_to);
                promoted = true;
            }
            profile.touch();
        }

        Ok(VouchInsert::Inserted { vouch_count, promoted })
    }

    async fn vouch_count(&self, target_id: &UserId) -> Result<u32> {
        let tables = self.tables.read().await;
        Ok(tables.vouch_count(target_id))
    }

    async fn vouches_for(&self, target_id: &UserId) -> Result<Vec<VouchRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .vouches
            .iter()
            .filter(|v| &v.target_id == target_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SpamReportStore for InMemoryTrustStore {
    async fn insert_report(&self, report: SpamReport) -> Result<ReportInsert> {
        let mut tables = self.tables.write().await;
        let pair = (report.reporter_id.clone(), report.reported_id.clone());
        let reported_id = report.reported_id.clone();

        if !tables.report_pairs.insert(pair) {
            let distinct_reporters = tables.distinct_reporters(&reported_id);
            return Ok(ReportInsert::Duplicate { distinct_reporters });
        }

        tables.reports.push(report);
        let distinct_reporters = tables.distinct_reporters(&reported_id);
        Ok(ReportInsert::Inserted { distinct_reporters })
    }

    async fn reports_against(&self, reported_id: &UserId) -> Result<Vec<SpamReport>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reports
            .iter()
            .filter(|r| &r.reported_id == reported_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContentStore for InMemoryTrustStore {
    async fn insert_content(&self, record: ContentRecord, action: Option<QualifyingAction>) -> Result<()> {
        if action.is_some() {
            self.check_action_log()?;
        }
        let mut tables = self.tables.write().await;
        if tables.content.contains_key(&record.content_id) {
            return Err(CoreError::conflict(format!("content {}", record.content_id)));
        }
        if let Some(action) = action {
            if tables.action_ids.contains(&action.action_id) {
                return Err(CoreError::conflict(format!("action {}", action.action_id)));
            }
            tables.action_ids.insert(action.action_id.clone());
            tables.actions.push(action);
        }
        tables.content.insert(record.content_id.clone(), record);
        Ok(())
    }

    async fn get_content(&self, content_id: &ContentId) -> Result<Option<ContentRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.content.get(content_id).cloned())
    }

    async fn content_by_author(&self, author_id: &UserId) -> Result<Vec<ContentRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<ContentRecord> = tables
            .content
            .values()
            .filter(|c| &c.author_id == author_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn update_content(&self, record: &ContentRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.content.get_mut(&record.content_id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(CoreError::not_found(format!("content {}", record.content_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, ContentKind};

    async fn store_with(users: &[&str]) -> InMemoryTrustStore {
        let store = InMemoryTrustStore::new();
        for user in users {
            store
                .insert_profile_if_absent(Profile::new(UserId::new(*user)))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_insert_profile_if_absent_keeps_existing() {
        let store = InMemoryTrustStore::new();
        let first = Profile::new(UserId::new("alice")).with_role(Role::Sme);
        store.insert_profile_if_absent(first).await.unwrap();

        let stored = store
            .insert_profile_if_absent(Profile::new(UserId::new("alice")))
            .await
            .unwrap();
        assert_eq!(stored.effective_role(), Role::Sme);
    }

    #[tokio::test]
    async fn test_update_role_touches_only_role() {
        let store = store_with(&["alice", "v1"]).await;
        let alice = UserId::new("alice");
        store
            .insert_vouch(VouchRecord::new(UserId::new("v1"), alice.clone()), 3, Role::Sme)
            .await
            .unwrap();

        store.update_role(&alice, Role::BusinessUser).await.unwrap();

        let profile = store.get_profile(&alice).await.unwrap().unwrap();
        assert_eq!(profile.effective_role(), Role::BusinessUser);
        assert_eq!(profile.vouch_count, 1);

        let err = store.update_role(&UserId::new("ghost"), Role::Standard).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    fn sum_fold(profile: &Profile, actions: &[QualifyingAction]) -> ReputationUpdate {
        ReputationUpdate {
            reputation_score: actions.iter().map(QualifyingAction::contribution).sum(),
            ..ReputationUpdate::of(profile)
        }
    }

    #[tokio::test]
    async fn test_apply_reputation_folds_history() {
        let store = store_with(&["alice"]).await;
        let alice = UserId::new("alice");
        store
            .append_action(QualifyingAction::new(alice.clone(), ActionKind::AcceptedAnswer))
            .await
            .unwrap();

        let change = store.apply_reputation(&alice, &sum_fold).await.unwrap().unwrap();
        assert!(change.changed());
        assert_eq!(change.previous.reputation_score, 0);
        assert_eq!(change.current.reputation_score, 15);

        let again = store.apply_reputation(&alice, &sum_fold).await.unwrap().unwrap();
        assert!(!again.changed());

        assert!(store
            .apply_reputation(&UserId::new("ghost"), &sum_fold)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_apply_reputation_writes_nothing_when_log_offline() {
        let store = store_with(&["alice"]).await;
        store.set_action_log_available(false);

        let err = store
            .apply_reputation(&UserId::new("alice"), &sum_fold)
            .await
            .unwrap_err();
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn test_insert_content_with_action_is_all_or_nothing() {
        let store = store_with(&["alice"]).await;
        let alice = UserId::new("alice");
        let review = || ContentRecord::new(alice.clone(), ContentKind::Review, "Worked for me");
        let action = || QualifyingAction::new(alice.clone(), ActionKind::ReviewPublished);

        store.set_action_log_available(false);
        assert!(store.insert_content(review(), Some(action())).await.is_err());
        store.set_action_log_available(true);
        assert!(store.content_by_author(&alice).await.unwrap().is_empty());
        assert!(store.actions_for(&alice).await.unwrap().is_empty());

        let logged = action().with_id(ActionId::new("a-1"));
        store.append_action(logged.clone()).await.unwrap();
        let err = store.insert_content(review(), Some(logged)).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert!(store.content_by_author(&alice).await.unwrap().is_empty());

        store.insert_content(review(), Some(action())).await.unwrap();
        assert_eq!(store.content_by_author(&alice).await.unwrap().len(), 1);
        assert_eq!(store.actions_for(&alice).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_append_action_is_idempotent() {
        let store = InMemoryTrustStore::new();
        let action = QualifyingAction::new(UserId::new("alice"), ActionKind::ReviewPublished)
            .with_id(ActionId::new("a-1"));

        assert!(store.append_action(action.clone()).await.unwrap());
        assert!(!store.append_action(action).await.unwrap());
        assert_eq!(store.actions_for(&UserId::new("alice")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_action_log_outage() {
        let store = InMemoryTrustStore::new();
        store.set_action_log_available(false);
        let err = store.actions_for(&UserId::new("alice")).await.unwrap_err();
        assert!(err.is_store_failure());

        store.set_action_log_available(true);
        assert!(store.actions_for(&UserId::new("alice")).await.is_ok());
    }

    #[tokio::test]
    async fn test_vouch_insert_promotes_at_threshold() {
        let store = store_with(&["target", "v1", "v2", "v3", "v4"]).await;
        let target = UserId::new("target");

        for (i, voucher) in ["v1", "v2", "v3", "v4"].iter().enumerate() {
            let outcome = store
                .insert_vouch(VouchRecord::new(UserId::new(*voucher), target.clone()), 3, Role::Sme)
                .await
                .unwrap();
            let expected_count = i as u32 + 1;
            assert_eq!(
                outcome,
                VouchInsert::Inserted {
                    vouch_count: expected_count,
                    promoted: expected_count == 3,
                }
            );
        }

        let profile = store.get_profile(&target).await.unwrap().unwrap();
        assert_eq!(profile.effective_role(), Role::Sme);
        assert_eq!(profile.vouch_count, 4);
    }

    #[tokio::test]
    async fn test_duplicate_vouch_is_reported() {
        let store = store_with(&["target", "v1"]).await;
        let record = VouchRecord::new(UserId::new("v1"), UserId::new("target"));

        store.insert_vouch(record.clone(), 3, Role::Sme).await.unwrap();
        let outcome = store.insert_vouch(record, 3, Role::Sme).await.unwrap();

        assert_eq!(outcome, VouchInsert::Duplicate { vouch_count: 1 });
        assert_eq!(store.vouches_for(&UserId::new("target")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_report_counts_once() {
        let store = InMemoryTrustStore::new();
        let report = SpamReport::new(UserId::new("r1"), UserId::new("spammer"), "links");

        let first = store.insert_report(report.clone()).await.unwrap();
        let second = store.insert_report(report).await.unwrap();

        assert_eq!(first, ReportInsert::Inserted { distinct_reporters: 1 });
        assert_eq!(second, ReportInsert::Duplicate { distinct_reporters: 1 });
    }
}
