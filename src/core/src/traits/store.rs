//! Relational store boundary
//!
//! The engine never talks to a database directly. Each table family has a
//! trait; `TrustStore` bundles them for components that need several.

use crate::error::Result;
use crate::types::{
    ActionId, BadgeType, ContentId, ContentRecord, Profile, QualifyingAction, Role, SpamReport, UserId,
    VouchRecord,
};
use async_trait::async_trait;

/// Reputation-derived profile columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationUpdate {
    pub reputation_score: u64,
    pub badge: BadgeType,
    pub needs_expert_review: bool,
}

impl ReputationUpdate {
    /// Columns as currently stored on `profile`
    pub fn of(profile: &Profile) -> Self {
        Self {
            reputation_score: profile.reputation_score,
            badge: profile.badge,
            needs_expert_review: profile.needs_expert_review,
        }
    }

    /// Copy the columns onto `profile`; returns whether anything changed
    pub fn apply_to(&self, profile: &mut Profile) -> bool {
        if Self::of(profile) == *self {
            return false;
        }
        profile.reputation_score = self.reputation_score;
        profile.badge = self.badge;
        profile.needs_expert_review = self.needs_expert_review;
        profile.touch();
        true
    }
}

/// Profile row on either side of an atomic reputation write
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationChange {
    pub previous: Profile,
    pub current: Profile,
}

impl ReputationChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Profiles keyed by user id
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get a profile by user id
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>>;

    /// Insert the profile unless one exists; returns the stored row either way
    async fn insert_profile_if_absent(&self, profile: Profile) -> Result<Profile>;

    /// Write only the role column, leaving reputation and vouch state to
    /// their own writers (`NotFound` if absent)
    async fn update_role(&self, user_id: &UserId, role: Role) -> Result<()>;

    /// All known user ids, used by batch sweeps
    async fn list_user_ids(&self) -> Result<Vec<UserId>>;
}

/// Append-only log of qualifying actions
#[async_trait]
pub trait ActionLog: Send + Sync {
    /// Append an action; returns `false` when the action id is already logged
    async fn append_action(&self, action: QualifyingAction) -> Result<bool>;

    /// Every logged action credited to a user, oldest first
    async fn actions_for(&self, user_id: &UserId) -> Result<Vec<QualifyingAction>>;

    /// Flag or unflag an action; returns the credited user when it exists
    async fn set_action_flag(&self, action_id: &ActionId, flagged: bool) -> Result<Option<UserId>>;

    /// Fold a user's history into their reputation columns as one atomic
    /// unit.
    ///
    /// The profile row is locked, the user's actions are read, `fold` maps
    /// both onto the new columns and the row is written only when they
    /// differ. No other reputation write for the user can interleave, so
    /// the stored columns always derive from a single consistent read of
    /// the log. Returns `None` when the profile does not exist; on error
    /// nothing is written.
    async fn apply_reputation(
        &self,
        user_id: &UserId,
        fold: &(dyn for<'p, 'a> Fn(&'p Profile, &'a [QualifyingAction]) -> ReputationUpdate + Send + Sync),
    ) -> Result<Option<ReputationChange>>;
}

/// Outcome of a vouch insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VouchInsert {
    /// Record stored; `promoted` is true only for the insert that brought
    /// the count to the threshold
    Inserted { vouch_count: u32, promoted: bool },

    /// Pair already recorded, nothing changed
    Duplicate { vouch_count: u32 },
}

/// Vouch records unique on `(voucher, target)`
#[async_trait]
pub trait VouchStore: Send + Sync {
    /// Insert a vouch and, within the same atomic unit, promote the target
    /// to `promote_to` when the stored count first reaches `threshold`.
    ///
    /// Implementations must serialize concurrent inserts for one target so
    /// the returned count always equals the stored record count and at most
    /// one caller observes `promoted == true`.
    async fn insert_vouch(
        &self,
        record: VouchRecord,
        threshold: u32,
        promote_to: Role,
    ) -> Result<VouchInsert>;

    /// Number of stored vouches targeting a user
    async fn vouch_count(&self, target_id: &UserId) -> Result<u32>;

    /// Vouches targeting a user, oldest first
    async fn vouches_for(&self, target_id: &UserId) -> Result<Vec<VouchRecord>>;
}

/// Outcome of a spam report insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportInsert {
    Inserted { distinct_reporters: u32 },
    Duplicate { distinct_reporters: u32 },
}

/// Spam reports unique on `(reporter, reported)`
#[async_trait]
pub trait SpamReportStore: Send + Sync {
    async fn insert_report(&self, report: SpamReport) -> Result<ReportInsert>;

    async fn reports_against(&self, reported_id: &UserId) -> Result<Vec<SpamReport>>;
}

/// Stored reviews, comments, and profile claims
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store content together with the qualifying action it earns.
    ///
    /// Both rows are written in one atomic unit: if either insert fails
    /// (duplicate ids, unreachable action log) neither is stored.
    async fn insert_content(&self, record: ContentRecord, action: Option<QualifyingAction>) -> Result<()>;

    async fn get_content(&self, content_id: &ContentId) -> Result<Option<ContentRecord>>;

    /// Content written by a user, oldest first
    async fn content_by_author(&self, author_id: &UserId) -> Result<Vec<ContentRecord>>;

    /// Overwrite an existing row (`NotFound` if absent)
    async fn update_content(&self, record: &ContentRecord) -> Result<()>;
}

/// Every table the trust engine touches
pub trait TrustStore:
    ProfileStore + ActionLog + VouchStore + SpamReportStore + ContentStore
{
}

impl<T> TrustStore for T where
    T: ProfileStore + ActionLog + VouchStore + SpamReportStore + ContentStore
{
}
