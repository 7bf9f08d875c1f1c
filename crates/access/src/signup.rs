//! Signup flow: form validation, provider sign-up, profile write,
//! invitation consumption.
//!
//! The write path to the profile store lives here (never in the gate). With
//! an invitation token, the row write and the token acceptance are one atomic
//! store operation.

use std::sync::Arc;

use thiserror::Error;

use fleetgate_core::{DomainError, DomainResult};

use crate::identity::{AuthError, IdentityService};
use crate::invitation::InvitationToken;
use crate::profile::{AccountStatus, NewProfile};
use crate::provider::{IdentityProvider, NewSignup};
use crate::role::Role;
use crate::session::Identity;
use crate::store::{ProfileStore, StoreError};

const MIN_PASSWORD_LEN: usize = 8;

/// Raw signup form input, validated before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    /// Only honored for self-service roles; company roles come from the
    /// invitation claim.
    pub requested_role: Option<Role>,
    pub invitation_token: Option<InvitationToken>,
}

impl SignupForm {
    /// Shape checks only; nothing here touches the network.
    pub fn validate(&self) -> DomainResult<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        if self.full_name.trim().is_empty() {
            return Err(DomainError::validation("full name cannot be empty"));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation("password too short"));
        }
        if self.password != self.confirm_password {
            return Err(DomainError::validation("passwords do not match"));
        }
        if self.invitation_token.is_none() {
            // Self-service signups are transport managers only; privileged
            // roles require an invitation or platform ownership.
            match self.requested_role {
                None | Some(Role::Tm) => {}
                Some(other) => {
                    return Err(DomainError::validation(format!(
                        "role '{other}' requires an invitation"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Signup failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignupError {
    /// Form input rejected before any network call.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Composes provider sign-up, invitation claim, and the profile row write.
#[derive(Debug)]
pub struct SignupFlow<P, S> {
    identity: IdentityService<P>,
    store: Arc<S>,
}

impl<P: IdentityProvider, S: ProfileStore> SignupFlow<P, S> {
    pub fn new(identity: IdentityService<P>, store: Arc<S>) -> Self {
        Self { identity, store }
    }

    /// Run the full signup: validate, claim the invitation (if any), sign up
    /// with the provider, write the profile row (accepting the token
    /// atomically on the store side).
    pub async fn sign_up(&self, form: &SignupForm) -> Result<Identity, SignupError> {
        form.validate()?;

        // Invitation claim binds company + role; checked before the provider
        // call so a dead token fails fast without creating an identity.
        let claim = match &form.invitation_token {
            Some(token) => {
                let claim = self.store.invitation(token).await?;
                if !claim.role.is_company_role() {
                    return Err(DomainError::invariant(
                        "invitation grants a non-company role",
                    )
                    .into());
                }
                Some(claim)
            }
            None => None,
        };

        let (role, company_id) = match &claim {
            Some(claim) => (claim.role, Some(claim.company_id)),
            None => (form.requested_role.unwrap_or(Role::Tm), None),
        };

        let signup = NewSignup {
            email: form.email.trim().to_lowercase(),
            password: form.password.clone(),
            full_name: form.full_name.trim().to_string(),
            requested_role: Some(role),
            company_ref: company_id,
        };

        let identity = self.identity.sign_up(&signup).await?;

        let profile = NewProfile {
            subject: identity.subject,
            role,
            full_name: signup.full_name.clone(),
            email: signup.email.clone(),
            company_id,
            status: AccountStatus::Active,
        };

        self.store
            .create(profile, form.invitation_token.as_ref())
            .await?;

        tracing::info!(subject = %identity.subject, role = %role, "signup completed");
        Ok(identity)
    }
}
