//! Session and identity data as observed from the identity provider.
//!
//! These types are read-only views: sessions are created and invalidated on
//! the provider side, this core only observes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetgate_core::{CompanyId, SubjectId};

use crate::role::Role;

/// Opaque provider-issued token material. Never inspected by this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Proof of authentication issued by the identity provider.
///
/// Not persisted or mutated here; invalidated on sign-out or provider-side
/// expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub subject: SubjectId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub token: SessionToken,
}

/// Provider-issued metadata attached to an identity at sign-up time.
///
/// The role here is *tentative* (supplied by the signup flow); the durable
/// role lives in the profile store and wins on every gate resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IdentityMetadata {
    pub requested_role: Option<Role>,
    pub company_ref: Option<CompanyId>,
    /// Anything else the provider attached; opaque to this core.
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// The authenticated subject as known to the provider.
///
/// Ephemeral: exists only while a [`Session`] exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: SubjectId,
    pub email: String,
    #[serde(default)]
    pub metadata: IdentityMetadata,
}

/// A session together with the identity it proves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authenticated {
    pub session: Session,
    pub identity: Identity,
}
