//! Capabilities and authorization decisions

use chrono::{DateTime, Utc};
use remedyhub_core::{Role, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Privileged external actions and the role each requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Edit a claimed brand listing
    EditBrandListing,

    /// Audit a submitted product
    AuditProduct,

    /// Vouch for a peer
    Vouch,

    /// Certify a member as SME
    CertifySme,

    /// Close an expert-review application
    ResolveExpertReview,

    /// Read spam reports filed against members
    ViewSpamReports,

    /// Work the admin review queue
    AdminReviewQueue,

    /// Clear flags on auto-flagged content
    UnflagContent,

    /// Lower a member's role
    DemoteUser,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::EditBrandListing,
        Capability::AuditProduct,
        Capability::Vouch,
        Capability::CertifySme,
        Capability::ResolveExpertReview,
        Capability::ViewSpamReports,
        Capability::AdminReviewQueue,
        Capability::UnflagContent,
        Capability::DemoteUser,
    ];

    pub fn required_role(&self) -> Role {
        match self {
            Capability::EditBrandListing => Role::BusinessUser,
            Capability::AuditProduct | Capability::Vouch => Role::Sme,
            Capability::CertifySme
            | Capability::ResolveExpertReview
            | Capability::ViewSpamReports => Role::SmeAdmin,
            Capability::AdminReviewQueue | Capability::UnflagContent | Capability::DemoteUser => {
                Role::Admin
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::EditBrandListing => "edit_brand_listing",
            Capability::AuditProduct => "audit_product",
            Capability::Vouch => "vouch",
            Capability::CertifySme => "certify_sme",
            Capability::ResolveExpertReview => "resolve_expert_review",
            Capability::ViewSpamReports => "view_spam_reports",
            Capability::AdminReviewQueue => "admin_review_queue",
            Capability::UnflagContent => "unflag_content",
            Capability::DemoteUser => "demote_user",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthzDecision {
    /// Unique decision identifier
    pub id: String,

    /// Whether the request is allowed
    pub allowed: bool,

    pub user_id: UserId,

    pub capability: Capability,

    pub required_role: Role,

    /// Effective role, `None` when the user has no profile
    pub actual_role: Option<Role>,

    /// Reason for the decision
    pub reason: String,

    /// Decision timestamp
    pub decided_at: DateTime<Utc>,
}

impl AuthzDecision {
    /// Create a new decision
    pub fn new(
        allowed: bool,
        user_id: UserId,
        capability: Capability,
        actual_role: Option<Role>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            allowed,
            user_id,
            capability,
            required_role: capability.required_role(),
            actual_role,
            reason: reason.into(),
            decided_at: Utc::now(),
        }
    }
}
