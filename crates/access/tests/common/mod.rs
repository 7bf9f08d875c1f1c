//! Shared test doubles for the provider, store, and navigation boundaries.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};

use fleetgate_access::{
    AccountStatus, AuthEvent, AuthEvents, Authenticated, GateState, Identity, IdentityMetadata,
    IdentityProvider, InvitationClaim, InvitationToken, Navigator, NewProfile, NewSignup, Profile,
    ProfileStore, ProviderError, Role, Session, SessionToken, StoreError,
};
use fleetgate_core::SubjectId;

pub fn setup() {
    fleetgate_observability::init();
}

pub fn authenticated(subject: SubjectId, email: &str) -> Authenticated {
    let now = Utc::now();
    Authenticated {
        session: Session {
            subject,
            issued_at: now,
            expires_at: now + chrono::Duration::hours(1),
            token: SessionToken::new("opaque-test-token"),
        },
        identity: Identity {
            subject,
            email: email.to_string(),
            metadata: IdentityMetadata::default(),
        },
    }
}

pub fn profile(subject: SubjectId, role: Role, status: AccountStatus) -> Profile {
    Profile {
        subject,
        role,
        full_name: "Test Account".to_string(),
        email: "account@example.com".to_string(),
        company_id: None,
        status,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity provider double
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockProvider {
    session: Mutex<Option<Authenticated>>,
    accounts: Mutex<HashMap<String, String>>,
    emitters: Mutex<Vec<mpsc::UnboundedSender<AuthEvent>>>,
    unreachable: AtomicBool,
    pub sign_out_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_session(&self, session: Option<Authenticated>) {
        *self.session.lock().unwrap() = session;
    }

    pub fn register(&self, email: &str, password: &str) {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), password.to_string());
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Emit an auth-state change to every live subscription, pruning dead
    /// ones (same fan-out contract as a real adapter).
    pub fn emit(&self, event: AuthEvent) {
        self.emitters
            .lock()
            .unwrap()
            .retain(|sender| sender.send(event).is_ok());
    }

    fn check_reachable(&self) -> Result<(), ProviderError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unreachable("provider offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn get_session(&self) -> Result<Option<Authenticated>, ProviderError> {
        self.check_reachable()?;
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Authenticated, ProviderError> {
        self.check_reachable()?;
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            None => Err(ProviderError::UnknownEmail),
            Some(stored) if stored != password => Err(ProviderError::CredentialsRejected),
            Some(_) => {
                drop(accounts);
                let session = authenticated(SubjectId::new(), email);
                *self.session.lock().unwrap() = Some(session.clone());
                Ok(session)
            }
        }
    }

    async fn sign_up(&self, signup: &NewSignup) -> Result<Identity, ProviderError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&signup.email) {
            return Err(ProviderError::EmailTaken);
        }
        accounts.insert(signup.email.clone(), signup.password.clone());
        Ok(Identity {
            subject: SubjectId::new(),
            email: signup.email.clone(),
            metadata: IdentityMetadata {
                requested_role: signup.requested_role,
                company_ref: signup.company_ref,
                extra: serde_json::Value::Null,
            },
        })
    }

    async fn reset_password_for_email(&self, email: &str) -> Result<(), ProviderError> {
        self.check_reachable()?;
        if !self.accounts.lock().unwrap().contains_key(email) {
            return Err(ProviderError::UnknownEmail);
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    fn subscribe(&self) -> AuthEvents {
        let (sender, events) = AuthEvents::channel();
        self.emitters.lock().unwrap().push(sender);
        events
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile store double
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    profiles: Mutex<HashMap<SubjectId, Profile>>,
    invitations: Mutex<HashMap<String, InvitationClaim>>,
    unavailable: AtomicBool,
    hold_fetch: Mutex<Option<oneshot::Receiver<()>>>,
    pub create_calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.profiles.lock().unwrap().insert(profile.subject, profile);
    }

    pub fn stored_profile(&self, subject: SubjectId) -> Option<Profile> {
        self.profiles.lock().unwrap().get(&subject).cloned()
    }

    pub fn insert_invitation(&self, token: &InvitationToken, claim: InvitationClaim) {
        self.invitations
            .lock()
            .unwrap()
            .insert(token.as_str().to_string(), claim);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make the next `fetch` block until the returned sender fires (or is
    /// dropped). Used to keep a resolution pipeline in flight.
    pub fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        *self.hold_fetch.lock().unwrap() = Some(receiver);
        sender
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MockStore {
    async fn fetch(&self, subject: SubjectId) -> Result<Option<Profile>, StoreError> {
        let hold = self.hold_fetch.lock().unwrap().take();
        if let Some(release) = hold {
            let _ = release.await;
        }
        self.check_available()?;
        Ok(self.profiles.lock().unwrap().get(&subject).cloned())
    }

    async fn create(
        &self,
        profile: NewProfile,
        invitation: Option<&InvitationToken>,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        if let Some(token) = invitation {
            let mut invitations = self.invitations.lock().unwrap();
            match invitations.get_mut(token.as_str()) {
                None => return Err(StoreError::InvitationNotFound),
                Some(claim) if claim.accepted_at.is_some() => {
                    return Err(StoreError::InvitationAlreadyAccepted);
                }
                Some(claim) => claim.accepted_at = Some(Utc::now()),
            }
        }
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.profiles.lock().unwrap().insert(
            profile.subject,
            Profile {
                subject: profile.subject,
                role: profile.role,
                full_name: profile.full_name,
                email: profile.email,
                company_id: profile.company_id,
                status: profile.status,
            },
        );
        Ok(())
    }

    async fn invitation(&self, token: &InvitationToken) -> Result<InvitationClaim, StoreError> {
        self.check_available()?;
        let invitations = self.invitations.lock().unwrap();
        match invitations.get(token.as_str()) {
            None => Err(StoreError::InvitationNotFound),
            Some(claim) if claim.accepted_at.is_some() => {
                Err(StoreError::InvitationAlreadyAccepted)
            }
            Some(claim) => Ok(claim.clone()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Navigation double
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.paths.lock().unwrap().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Wait until the gate leaves `Loading` (bounded).
pub async fn settled(state: &mut watch::Receiver<GateState>) -> GateState {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let current = state.borrow().clone();
            if !matches!(current, GateState::Loading) {
                return current;
            }
            state.changed().await.expect("gate task ended while loading");
        }
    })
    .await
    .expect("gate did not settle in time")
}

/// Give the mounted gate task a chance to process pending events.
pub async fn breathe() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}
