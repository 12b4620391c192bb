//! Error types for content admission

use remedyhub_core::{CoreError, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModerationError {
    /// Service unreachable or timed out
    #[error("Moderation service unavailable: {0}")]
    Unavailable(String),

    #[error("Moderation credential is not configured")]
    MissingCredential,

    /// Service answered with a non-success status or an undecodable body
    #[error("Moderation service error: {0}")]
    Service(String),

    #[error("Invalid spam report: {0}")]
    InvalidReport(String),

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Keyword source error: {0}")]
    KeywordSource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Store error: {0}")]
    Store(#[from] CoreError),
}

impl ModerationError {
    /// Verdict reason used when a classification attempt fails
    pub fn verdict_reason(&self) -> &'static str {
        match self {
            ModerationError::Unavailable(_) | ModerationError::MissingCredential => {
                "moderation_unavailable"
            }
            _ => "moderation_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, ModerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_reasons() {
        assert_eq!(
            ModerationError::Unavailable("timeout".into()).verdict_reason(),
            "moderation_unavailable"
        );
        assert_eq!(ModerationError::MissingCredential.verdict_reason(), "moderation_unavailable");
        assert_eq!(
            ModerationError::Service("status 500".into()).verdict_reason(),
            "moderation_error"
        );
    }
}
