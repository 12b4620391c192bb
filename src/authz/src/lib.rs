//! Role Authorization for RemedyHub
//!
//! Every privileged external action (admin review queues, SME
//! certification, brand edits, vouching) is checked against the caller's
//! current role. See [`RoleAuthorizer`] for the ordering rules and
//! [`Capability`] for what each action requires.

pub mod authorizer;
pub mod error;
pub mod types;

pub use authorizer::RoleAuthorizer;
pub use error::{AuthzError, Result};
pub use types::{AuthzDecision, Capability};
