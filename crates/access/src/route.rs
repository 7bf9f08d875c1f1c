//! Static role → landing-route table.
//!
//! This is the single source of truth for where each identity class lands;
//! both the login flow and the gate redirect through it.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Unauthenticated entry point (also the safe default for a missing role).
pub const LOGIN: &str = "/login";

/// Blocking entry point for suspended/expired accounts.
pub const SUSPENDED: &str = "/suspended";

pub const ADMIN: &str = "/admin";
pub const DASHBOARD: &str = "/dashboard";
pub const PORTAL: &str = "/portal";

/// Canonical landing path for a role.
///
/// Total over the closed [`Role`] enum; the "unknown role" fallback of the
/// route table survives as [`LOGIN`] for the missing-profile case.
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::PlatformOwner => ADMIN,
        Role::Tm => DASHBOARD,
        Role::CompanyAdmin => PORTAL,
        Role::CompanyViewer => PORTAL,
    }
}

/// Why an account is being routed to the suspended entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionReason {
    /// Account suspended by an operator.
    Inactive,
    /// Subscription lapsed.
    Expired,
}

impl SuspensionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuspensionReason::Inactive => "inactive",
            SuspensionReason::Expired => "expired",
        }
    }
}

impl core::fmt::Display for SuspensionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suspended entry point with the reason query, e.g. `/suspended?reason=expired`.
pub fn suspended_route(reason: SuspensionReason) -> String {
    format!("{SUSPENDED}?reason={reason}")
}
