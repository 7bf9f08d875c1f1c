//! Identity-provider boundary.
//!
//! Everything the core needs from the external identity provider, expressed
//! as an async trait plus an event subscription. Implementations adapt a
//! concrete provider SDK; the core never sees provider-specific payloads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use fleetgate_core::CompanyId;

use crate::role::Role;
use crate::session::{Authenticated, Identity};

/// Auth-state change emitted by the provider, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    /// Token rotation; carries no access-relevant change.
    TokenRefreshed,
    SessionExpired,
}

/// Failure at the provider boundary.
///
/// Adapters must surface an **explicit** duplicate-signup signal
/// ([`ProviderError::EmailTaken`]); inferring duplicates from response shape
/// is not supported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("credentials rejected")]
    CredentialsRejected,

    #[error("email already registered")]
    EmailTaken,

    #[error("no account for email")]
    UnknownEmail,

    #[error("identity provider unreachable: {0}")]
    Unreachable(String),
}

/// Sign-up request forwarded to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSignup {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub requested_role: Option<Role>,
    pub company_ref: Option<CompanyId>,
}

/// Subscription to provider auth-state changes.
///
/// Events arrive strictly in provider emission order; no reordering or
/// deduplication happens on this side. Dropping the subscription
/// unsubscribes (the provider prunes the dead sender on its next emit).
#[derive(Debug)]
pub struct AuthEvents {
    receiver: mpsc::UnboundedReceiver<AuthEvent>,
}

impl AuthEvents {
    /// Create a sender/subscription pair (for provider adapters and tests).
    pub fn channel() -> (mpsc::UnboundedSender<AuthEvent>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver })
    }

    /// Next event, or `None` once the provider side has shut down.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        self.receiver.recv().await
    }
}

/// External identity provider operations consumed by this core.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current session, if any. Absence is a normal result, not an error.
    async fn get_session(&self) -> Result<Option<Authenticated>, ProviderError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Authenticated, ProviderError>;

    async fn sign_up(&self, signup: &NewSignup) -> Result<Identity, ProviderError>;

    async fn reset_password_for_email(&self, email: &str) -> Result<(), ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Subscribe to auth-state changes for as long as the returned stream lives.
    fn subscribe(&self) -> AuthEvents;
}
