//! Invitation tokens (consumed here, managed by the signup/invitation flow).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetgate_core::CompanyId;

use crate::role::Role;

/// Single-use token binding a prospective company signup to a tenant.
///
/// Invariant (store-enforced): once accepted, never consumable again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationToken(String);

impl InvitationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What a valid, unaccepted invitation grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationClaim {
    pub company_id: CompanyId,
    pub role: Role,
    /// Set exactly once, when a signup presenting the token completes.
    pub accepted_at: Option<DateTime<Utc>>,
}
