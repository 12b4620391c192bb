//! Error types for the trust engine facade

use remedyhub_authz::AuthzError;
use remedyhub_core::{ContentId, CoreError, UserId};
use remedyhub_moderation::ModerationError;
use remedyhub_reputation::ReputationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid citation '{citation}': {reason}")]
    InvalidCitation { citation: String, reason: String },

    #[error("Banned members cannot post: {0}")]
    Banned(UserId),

    #[error("Profile not found: {0}")]
    ProfileNotFound(UserId),

    #[error("Content not found: {0}")]
    ContentNotFound(ContentId),

    #[error(transparent)]
    Reputation(#[from] ReputationError),

    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error("Store error: {0}")]
    Store(#[from] CoreError),
}

impl EngineError {
    /// Validation and authorization failures are the caller's to fix
    pub fn is_client_error(&self) -> bool {
        match self {
            EngineError::InvalidInput(_)
            | EngineError::InvalidCitation { .. }
            | EngineError::Banned(_)
            | EngineError::ProfileNotFound(_)
            | EngineError::ContentNotFound(_)
            | EngineError::Authz(AuthzError::Forbidden { .. }) => true,
            EngineError::Reputation(e) => !matches!(
                e,
                ReputationError::Store(_) | ReputationError::HistoryUnavailable { .. } | ReputationError::Metrics(_)
            ),
            EngineError::Moderation(e) => matches!(
                e,
                ModerationError::InvalidReport(_) | ModerationError::UnknownUser(_)
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
