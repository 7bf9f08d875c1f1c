//! `fleetgate-access` — session & access-control core (zero-trust).
//!
//! This crate decides, on every protected entry point, whether the caller may
//! proceed or must be redirected, and keeps that decision consistent across
//! asynchronous identity-provider events. It is intentionally decoupled from
//! HTTP, storage, and rendering: the identity provider, profile store, and
//! navigation are boundary traits.

pub mod context;
pub mod gate;
pub mod identity;
pub mod invitation;
pub mod navigation;
pub mod profile;
pub mod provider;
pub mod role;
pub mod route;
pub mod router;
pub mod session;
pub mod signup;
pub mod store;

pub use context::{AccessContext, AccessSnapshot, SignOutHandle};
pub use gate::{GateError, GateHandle, GateState, MountedGate, SessionGate};
pub use identity::{AuthError, IdentityService, SignOut};
pub use invitation::{InvitationClaim, InvitationToken};
pub use navigation::Navigator;
pub use profile::{AccountStatus, NewProfile, Profile, ProfileResolver, ResolveError};
pub use provider::{AuthEvent, AuthEvents, IdentityProvider, NewSignup, ProviderError};
pub use role::Role;
pub use route::SuspensionReason;
pub use router::{Decision, Redirect, decide};
pub use session::{Authenticated, Identity, IdentityMetadata, Session, SessionToken};
pub use signup::{SignupError, SignupFlow, SignupForm};
pub use store::{ProfileStore, StoreError};
