//! Error types for role authorization

use crate::types::Capability;
use remedyhub_core::{CoreError, Role, UserId};
use thiserror::Error;

/// Authorization errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Caller lacks the role a capability requires
    #[error("{user_id} may not {capability}: requires {required}, has {}", .actual.map(|r| r.as_str()).unwrap_or("no profile"))]
    Forbidden {
        user_id: UserId,
        capability: Capability,
        required: Role,
        actual: Option<Role>,
    },

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] CoreError),
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
