//! Role hierarchy and the legacy boolean flag mapping

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Member role, totally ordered from least to most privileged.
///
/// The derived `Ord` follows declaration order, so comparisons like
/// `role >= Role::Sme` express "at or above the SME tier".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular community member
    Standard,
    /// Brand representative managing listings
    BusinessUser,
    /// Subject-matter expert
    Sme,
    /// SME with administrative duties over other SMEs
    SmeAdmin,
    /// Platform administrator
    Admin,
}

impl Role {
    /// All roles, lowest first
    pub const ALL: [Role; 5] = [
        Role::Standard,
        Role::BusinessUser,
        Role::Sme,
        Role::SmeAdmin,
        Role::Admin,
    ];

    /// Position in the role ordering, starting at 1 for `Standard`
    pub fn tier(self) -> u8 {
        match self {
            Role::Standard => 1,
            Role::BusinessUser => 2,
            Role::Sme => 3,
            Role::SmeAdmin => 4,
            Role::Admin => 5,
        }
    }

    /// Look up a role by its tier number
    pub fn from_tier(tier: u8) -> Option<Role> {
        Role::ALL.iter().copied().find(|role| role.tier() == tier)
    }

    /// Stable storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "standard",
            Role::BusinessUser => "business_user",
            Role::Sme => "sme",
            Role::SmeAdmin => "sme_admin",
            Role::Admin => "admin",
        }
    }

    /// Check whether this role satisfies a required role
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Role::Standard),
            "business_user" => Ok(Role::BusinessUser),
            "sme" => Ok(Role::Sme),
            "sme_admin" => Ok(Role::SmeAdmin),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::invalid(format!("unknown role '{}'", other))),
        }
    }
}

/// Boolean flags that predate the `role` column.
///
/// Rows written before the role migration carry only these flags. They are
/// read for compatibility and never written by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyFlags {
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_verified_expert: bool,
    #[serde(default)]
    pub is_sme: bool,
}

impl LegacyFlags {
    /// Role implied by the legacy flags alone.
    ///
    /// `is_admin` maps to `Admin`, `is_verified_expert` to `SmeAdmin`,
    /// `is_sme` to `Sme`; no flag maps to `Standard`.
    pub fn implied_role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else if self.is_verified_expert {
            Role::SmeAdmin
        } else if self.is_sme {
            Role::Sme
        } else {
            Role::Standard
        }
    }
}

/// Resolve the role used for every trust decision.
///
/// An explicit role always wins; legacy flags are consulted only when the
/// row has no role so a migration never silently revokes access.
pub fn effective_role(explicit: Option<Role>, legacy: &LegacyFlags) -> Role {
    explicit.unwrap_or_else(|| legacy.implied_role())
}
