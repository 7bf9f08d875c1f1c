//! `IdentityService` — stateless facade over the identity provider.
//!
//! Maps raw provider results onto the core's error taxonomy and enforces the
//! contract details a raw provider does not: unknown-email password resets
//! must not leak account existence, and sign-out is idempotent.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::provider::{AuthEvents, IdentityProvider, NewSignup, ProviderError};
use crate::session::{Authenticated, Identity};

/// Authentication failure as surfaced to callers of the facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailAlreadyRegistered,

    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        match err {
            // Unknown email is deliberately indistinguishable from a bad
            // password everywhere except password reset, which suppresses it.
            ProviderError::CredentialsRejected | ProviderError::UnknownEmail => {
                AuthError::InvalidCredentials
            }
            ProviderError::EmailTaken => AuthError::EmailAlreadyRegistered,
            ProviderError::Unreachable(msg) => AuthError::ProviderUnavailable(msg),
        }
    }
}

/// Stateless facade over the external identity provider.
#[derive(Debug)]
pub struct IdentityService<P> {
    provider: Arc<P>,
}

impl<P> Clone for IdentityService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: IdentityProvider> IdentityService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Current session, if any. `Ok(None)` for "not signed in".
    pub async fn current_session(&self) -> Result<Option<Authenticated>, AuthError> {
        Ok(self.provider.get_session().await?)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Authenticated, AuthError> {
        Ok(self.provider.sign_in_with_password(email, password).await?)
    }

    /// Fails with [`AuthError::EmailAlreadyRegistered`] when the provider
    /// reports an existing identity instead of creating a pending one.
    pub async fn sign_up(&self, signup: &NewSignup) -> Result<Identity, AuthError> {
        Ok(self.provider.sign_up(signup).await?)
    }

    /// Always reports success for unknown emails (no account-existence leak);
    /// provider transport failures still surface.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        match self.provider.reset_password_for_email(email).await {
            Ok(()) | Err(ProviderError::UnknownEmail) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Idempotent; safe to call with no active session. Provider failures are
    /// logged and swallowed — convergence happens via the `SignedOut` event
    /// or the next resolution.
    pub async fn sign_out(&self) {
        if let Err(err) = self.provider.sign_out().await {
            tracing::warn!(error = %err, "sign-out reported a provider error; ignoring");
        }
    }

    /// Subscribe to provider auth-state changes.
    pub fn subscribe(&self) -> AuthEvents {
        self.provider.subscribe()
    }
}

/// Object-safe sign-out capability handed to the protected subtree.
#[async_trait]
pub trait SignOut: Send + Sync {
    async fn sign_out(&self);
}

#[async_trait]
impl<P: IdentityProvider> SignOut for IdentityService<P> {
    async fn sign_out(&self) {
        IdentityService::sign_out(self).await;
    }
}
