//! Shared traits for the trust engine

pub mod store;

// Re-export commonly used traits
pub use store::{
    ActionLog, ContentStore, ProfileStore, ReportInsert, ReputationChange, ReputationUpdate,
    SpamReportStore, TrustStore, VouchInsert, VouchStore,
};
