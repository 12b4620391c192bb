//! Shared types for the trust engine

pub mod role;
pub mod profile;
pub mod action;
pub mod vouch;
pub mod report;
pub mod content;

// Re-export commonly used types
pub use role::{effective_role, LegacyFlags, Role};
pub use profile::{BadgeType, Profile, UserId};
pub use action::{ActionId, ActionKind, QualifyingAction};
pub use vouch::VouchRecord;
pub use report::SpamReport;
pub use content::{ContentId, ContentKind, ContentRecord};
