//! Unified error types for the trust store boundary
//!
//! Subsystem crates wrap `CoreError` in their own error enums via `#[from]`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for the RemedyHub platform
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backing store failed or is unreachable
    #[error("Store error: {0}")]
    Store(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input/state
    #[error("Invalid: {0}")]
    Invalid(String),

    /// Unique constraint or concurrent modification conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/Deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Create a store error
    pub fn store<S: Into<String>>(msg: S) -> Self {
        CoreError::Store(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        CoreError::NotFound(msg.into())
    }

    /// Create an invalid error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        CoreError::Invalid(msg.into())
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        CoreError::Conflict(msg.into())
    }

    /// Whether the error originates in the backing store rather than the input
    pub fn is_store_failure(&self) -> bool {
        matches!(self, CoreError::Store(_))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let err = CoreError::store("test");
        assert!(matches!(err, CoreError::Store(_)));
        assert!(err.is_store_failure());

        let err = CoreError::not_found("test");
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(!err.is_store_failure());
    }

    #[test]
    fn test_error_display() {
        let err = CoreError::store("connection refused");
        assert_eq!(err.to_string(), "Store error: connection refused");

        let err = CoreError::invalid("self vouch");
        assert_eq!(err.to_string(), "Invalid: self vouch");
    }
}
