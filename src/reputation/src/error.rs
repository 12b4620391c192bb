//! Error types for the reputation system

use remedyhub_core::{CoreError, Role, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReputationError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(UserId),

    /// The action history could not be read; stored score is untouched
    #[error("Action history unavailable for {user_id}: {reason}")]
    HistoryUnavailable { user_id: UserId, reason: String },

    #[error("{user_id} has role {role}, {required} or above is required")]
    InsufficientRole {
        user_id: UserId,
        role: Role,
        required: Role,
    },

    #[error("Banned members cannot vouch: {0}")]
    VoucherBanned(UserId),

    #[error("{target_id} already holds role {role}")]
    TargetAlreadyElevated { target_id: UserId, role: Role },

    #[error("Members cannot vouch for themselves")]
    SelfVouch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Store error: {0}")]
    Store(#[from] CoreError),

    #[error("Prometheus metric error: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, ReputationError>;
