//! Profile-store boundary.
//!
//! One single-row read keyed by subject, plus the write path owned by the
//! signup/invitation flow. The store — not this core — is responsible for
//! making the profile write and the invitation acceptance atomic.

use async_trait::async_trait;
use thiserror::Error;

use fleetgate_core::SubjectId;

use crate::invitation::{InvitationClaim, InvitationToken};
use crate::profile::{NewProfile, Profile};

/// Failure at the profile-store boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("profile store unavailable: {0}")]
    Unavailable(String),

    #[error("invitation not found")]
    InvitationNotFound,

    /// The single-use token was already consumed.
    #[error("invitation already accepted")]
    InvitationAlreadyAccepted,
}

/// Backing store for profiles and invitation claims.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Single-row read by subject. `Ok(None)` when no row exists yet.
    async fn fetch(&self, subject: SubjectId) -> Result<Option<Profile>, StoreError>;

    /// Create/update the profile row; when a token is presented, mark it
    /// accepted atomically with the write. Fails with
    /// [`StoreError::InvitationAlreadyAccepted`] on a lost race.
    async fn create(
        &self,
        profile: NewProfile,
        invitation: Option<&InvitationToken>,
    ) -> Result<(), StoreError>;

    /// Look up an unaccepted invitation claim.
    async fn invitation(&self, token: &InvitationToken) -> Result<InvitationClaim, StoreError>;
}
