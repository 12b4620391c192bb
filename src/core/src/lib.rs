//! # RemedyHub Core
//!
//! Shared types, store traits, and error handling for the RemedyHub trust
//! engine. Reputation, moderation, and authorization crates depend on this
//! package and never on each other's storage details.

pub mod types;
pub mod traits;
pub mod store;
pub mod error;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{
    ActionId, ActionKind, BadgeType, ContentId, ContentKind, ContentRecord, LegacyFlags,
    Profile, QualifyingAction, Role, SpamReport, UserId, VouchRecord,
};
pub use traits::{
    ActionLog, ContentStore, ProfileStore, ReportInsert, ReputationChange, ReputationUpdate,
    SpamReportStore, TrustStore, VouchInsert, VouchStore,
};
pub use store::InMemoryTrustStore;

#[cfg(feature = "postgres")]
pub use store::PostgresTrustStore;
