//! Role authorizer
//!
//! Roles form a total order: standard < business_user < sme < sme_admin <
//! admin. A user holding role `r` satisfies every requirement at or below
//! `r`. Profiles without an explicit role are mapped from their legacy
//! flags. Unknown and banned users hold no privileges.

use crate::error::{AuthzError, Result};
use crate::types::{AuthzDecision, Capability};
use remedyhub_core::{ProfileStore, Role, TrustStore, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct RoleAuthorizer {
    store: Arc<dyn TrustStore>,
}

impl RoleAuthorizer {
    pub fn new(store: Arc<dyn TrustStore>) -> Self {
        Self { store }
    }

    /// Effective role, `None` for unknown or banned users
    pub async fn role_of(&self, user_id: &UserId) -> Result<Option<Role>> {
        if user_id.is_blank() {
            return Ok(None);
        }
        let profile = self.store.get_profile(user_id).await?;
        Ok(profile
            .filter(|p| !p.is_banned)
            .map(|p| p.effective_role()))
    }

    /// Whether the user's role is at or above `required`
    pub async fn authorize(&self, user_id: &UserId, required: Role) -> Result<bool> {
        let allowed = self
            .role_of(user_id)
            .await?
            .map_or(false, |role| role.satisfies(required));
        debug!(user = %user_id, required = %required, allowed, "Role check");
        Ok(allowed)
    }

    /// Whether the user's effective role is exactly `role`
    pub async fn has_exact_role(&self, user_id: &UserId, role: Role) -> Result<bool> {
        Ok(self.role_of(user_id).await? == Some(role))
    }

    /// Evaluate a capability and explain the outcome
    pub async fn authorize_capability(
        &self,
        user_id: &UserId,
        capability: Capability,
    ) -> Result<AuthzDecision> {
        let required = capability.required_role();
        let actual = self.role_of(user_id).await?;

        let decision = match actual {
            Some(role) if role.satisfies(required) => AuthzDecision::new(
                true,
                user_id.clone(),
                capability,
                actual,
                format!("role {} satisfies {}", role, required),
            ),
            Some(role) => AuthzDecision::new(
                false,
                user_id.clone(),
                capability,
                actual,
                format!("role {} is below {}", role, required),
            ),
            None => AuthzDecision::new(
                false,
                user_id.clone(),
                capability,
                None,
                "unknown or banned user",
            ),
        };
        Ok(decision)
    }

    /// Fail with `Forbidden` unless the user holds the capability; returns their role
    pub async fn require(&self, user_id: &UserId, capability: Capability) -> Result<Role> {
        let decision = self.authorize_capability(user_id, capability).await?;
        match decision.actual_role {
            Some(role) if decision.allowed => Ok(role),
            actual => {
                warn!(user = %user_id, capability = %capability, reason = %decision.reason, "Forbidden");
                Err(AuthzError::Forbidden {
                    user_id: user_id.clone(),
                    capability,
                    required: decision.required_role,
                    actual,
                })
            }
        }
    }
}
