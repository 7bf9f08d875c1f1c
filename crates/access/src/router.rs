//! Role-based routing decision.
//!
//! Pure policy check for a protected area:
//! - No IO
//! - No panics
//! - No provider or store knowledge

use serde::{Deserialize, Serialize};

use crate::profile::Profile;
use crate::role::Role;
use crate::route::{self, SuspensionReason};

/// Where a denied caller is sent instead of the protected area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub target: String,
    pub reason: Option<SuspensionReason>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            target: path.into(),
            reason: None,
        }
    }

    /// Unauthenticated entry point (the safe default).
    pub fn login() -> Self {
        Self::to(route::LOGIN)
    }

    pub fn suspended(reason: SuspensionReason) -> Self {
        Self {
            target: route::suspended_route(reason),
            reason: Some(reason),
        }
    }
}

/// Outcome of the routing decision for a protected area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Redirect),
}

/// Decide whether a caller may enter an area constrained to `allowed_roles`.
///
/// Evaluation order:
/// 1. No profile → redirect to the unauthenticated entry point.
/// 2. Suspension/expiry — checked **before** role membership: an inactive
///    account must never reach a role-specific area even if its role matches.
/// 3. Role outside `allowed_roles` → redirect to that role's own landing route.
/// 4. Otherwise allow.
pub fn decide(profile: Option<&Profile>, allowed_roles: Option<&[Role]>) -> Decision {
    let Some(profile) = profile else {
        return Decision::Redirect(Redirect::login());
    };

    if let Some(reason) = profile.status.suspension_reason() {
        return Decision::Redirect(Redirect::suspended(reason));
    }

    if let Some(allowed) = allowed_roles {
        if !allowed.contains(&profile.role) {
            return Decision::Redirect(Redirect::to(route::landing_route(profile.role)));
        }
    }

    Decision::Allow
}
