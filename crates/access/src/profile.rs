//! Durable profile records and their resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fleetgate_core::{CompanyId, SubjectId};

use crate::role::Role;
use crate::route::SuspensionReason;
use crate::store::{ProfileStore, StoreError};

/// Activation/subscription status of an account.
///
/// An orthogonal signal to the role: an inactive account must never reach a
/// role-specific area even if its role would be allowed there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
    /// Subscription lapsed.
    Expired,
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }

    /// Why the account is barred from role-specific areas, if it is.
    pub fn suspension_reason(&self) -> Option<SuspensionReason> {
        match self {
            AccountStatus::Active => None,
            AccountStatus::Suspended => Some(SuspensionReason::Inactive),
            AccountStatus::Expired => Some(SuspensionReason::Expired),
        }
    }
}

/// Durable extended record for an identity, keyed by subject.
///
/// Owned by the profile store; created at sign-up (possibly asynchronously),
/// read on every gate resolution, never mutated by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub subject: SubjectId,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub company_id: Option<CompanyId>,
    pub status: AccountStatus,
}

/// Row written by the signup flow (the gate itself never writes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub subject: SubjectId,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub company_id: Option<CompanyId>,
    pub status: AccountStatus,
}

/// Profile resolution failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Identity exists but no profile row does yet (eventual-consistency gap
    /// right after sign-up). Callers fall back to the unprivileged default
    /// route; this is not fatal.
    #[error("no profile for subject")]
    ProfileMissing,

    /// Transport/store failure. Retryable, fatal to the current attempt,
    /// never silently ALLOW.
    #[error("profile store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Resolves the extended profile for an authenticated identity.
#[derive(Debug)]
pub struct ProfileResolver<S> {
    store: std::sync::Arc<S>,
}

impl<S> Clone for ProfileResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: std::sync::Arc::clone(&self.store),
        }
    }
}

impl<S: ProfileStore> ProfileResolver<S> {
    pub fn new(store: std::sync::Arc<S>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, subject: SubjectId) -> Result<Profile, ResolveError> {
        match self.store.fetch(subject).await {
            Ok(Some(profile)) => Ok(profile),
            Ok(None) => Err(ResolveError::ProfileMissing),
            Err(StoreError::Unavailable(msg)) => Err(ResolveError::StoreUnavailable(msg)),
            // Invitation errors cannot arise from a fetch; treat a
            // misbehaving store as unavailable rather than granting access.
            Err(other) => Err(ResolveError::StoreUnavailable(other.to_string())),
        }
    }
}
