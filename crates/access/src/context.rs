//! Access context published to the protected subtree.
//!
//! The only mutator is the mounted gate; consumers are read-only and must
//! treat "not yet resolved" as distinct from "resolved but unauthenticated".

use std::sync::Arc;

use crate::gate::GateState;
use crate::identity::SignOut;
use crate::profile::Profile;
use crate::session::Identity;

/// Cloneable sign-out capability, decoupled from the provider type.
#[derive(Clone)]
pub struct SignOutHandle(Arc<dyn SignOut>);

impl SignOutHandle {
    pub fn new(service: Arc<dyn SignOut>) -> Self {
        Self(service)
    }

    pub async fn sign_out(&self) {
        self.0.sign_out().await;
    }
}

impl core::fmt::Debug for SignOutHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SignOutHandle")
    }
}

/// What a protected view gets while the gate is READY.
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub identity: Identity,
    pub profile: Profile,
    sign_out: SignOutHandle,
}

impl AccessContext {
    pub fn new(identity: Identity, profile: Profile, sign_out: SignOutHandle) -> Self {
        Self {
            identity,
            profile,
            sign_out,
        }
    }

    pub async fn sign_out(&self) {
        self.sign_out.sign_out().await;
    }
}

/// Read-side view of the gate for descendant views.
#[derive(Debug, Clone, Default)]
pub enum AccessSnapshot {
    /// Resolution has not completed; render a loading affordance, never
    /// protected content.
    #[default]
    NotReady,
    /// Resolved: the caller is being routed away from this area.
    Unauthenticated,
    Ready(AccessContext),
}

impl AccessSnapshot {
    pub fn is_ready(&self) -> bool {
        matches!(self, AccessSnapshot::Ready(_))
    }

    pub fn context(&self) -> Option<&AccessContext> {
        match self {
            AccessSnapshot::Ready(context) => Some(context),
            _ => None,
        }
    }
}

impl From<&GateState> for AccessSnapshot {
    fn from(state: &GateState) -> Self {
        match state {
            GateState::Loading => AccessSnapshot::NotReady,
            // Blocking failure: no access decision was reached, so readers
            // still see "not yet available" rather than a half state.
            GateState::Failed(_) => AccessSnapshot::NotReady,
            GateState::Redirecting(_) => AccessSnapshot::Unauthenticated,
            GateState::Ready(context) => AccessSnapshot::Ready(context.clone()),
        }
    }
}
