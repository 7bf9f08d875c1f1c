//! The session gate: mounts in front of a protected area, resolves
//! session → profile → routing decision, and drives the visible state.
//!
//! The decision logic is an explicit state machine ([`GateMachine`], pure and
//! synchronous) with a generation counter implementing the supersede rule: a
//! pipeline triggered by event N is abandoned when event N+1 arrives, and its
//! eventual result is discarded. The async driver around it owns the provider
//! subscription, the single in-flight resolution, and the published state —
//! there is never more than one writer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::context::{AccessContext, AccessSnapshot, SignOutHandle};
use crate::identity::IdentityService;
use crate::navigation::Navigator;
use crate::profile::{Profile, ProfileResolver, ResolveError};
use crate::provider::{AuthEvent, AuthEvents, IdentityProvider};
use crate::role::Role;
use crate::router::{Decision, Redirect, decide};
use crate::session::Identity;
use crate::store::ProfileStore;

// ─────────────────────────────────────────────────────────────────────────────
// Published state
// ─────────────────────────────────────────────────────────────────────────────

/// Blocking resolution failure. Shown with a retry affordance; never grants
/// or denies access silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("identity provider unavailable: {0}")]
    Provider(String),

    #[error("profile store unavailable: {0}")]
    Store(String),
}

/// State the UI renders from. Fail-closed: only `Ready` may show protected
/// content.
#[derive(Debug, Clone)]
pub enum GateState {
    /// No decision yet (initial mount or a resolution in flight).
    Loading,
    /// Decision was Allow; the access context is live.
    Ready(AccessContext),
    /// Decision was a redirect; navigation has been triggered and children
    /// must not render (no flash of protected content).
    Redirecting(Redirect),
    /// Blocking failure, distinct from `Redirecting`: show a retry
    /// affordance.
    Failed(GateError),
}

impl GateState {
    pub fn is_ready(&self) -> bool {
        matches!(self, GateState::Ready(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State machine
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Resolving,
    Ready,
    Redirecting,
    Failed,
}

/// Result of one resolution pipeline run.
#[derive(Debug, Clone)]
pub(crate) enum PipelineOutcome {
    /// No session present.
    Unauthenticated,
    /// Session present; routing decision made. `profile` is `None` when the
    /// row does not exist yet (the decision then came from the
    /// missing-profile fallback).
    Decided {
        identity: Identity,
        profile: Option<Profile>,
        decision: Decision,
    },
    /// Provider or store failure; aborts this cycle only.
    Failed(GateError),
}

/// What the driver must do after feeding an event to the machine.
#[derive(Debug)]
pub(crate) enum EventStep {
    Ignore,
    /// Start a fresh resolution for this generation (replacing any in-flight
    /// one).
    Resolve(u64),
    /// Redirect to the unauthenticated entry point immediately, without
    /// resolving a profile.
    SignOut,
}

/// An outcome the machine accepted (i.e. it was not stale).
#[derive(Debug)]
pub(crate) enum Applied {
    Ready { identity: Identity, profile: Profile },
    Redirect(Redirect),
    Failed(GateError),
}

/// Explicit five-state machine: INIT → RESOLVING → {READY, REDIRECTING},
/// plus a blocking FAILED state. READY and REDIRECTING are terminal for the
/// current mount; any fresh trigger restarts at RESOLVING with a new
/// generation.
#[derive(Debug)]
pub(crate) struct GateMachine {
    phase: Phase,
    generation: u64,
}

impl GateMachine {
    pub(crate) fn new() -> Self {
        Self {
            phase: Phase::Init,
            generation: 0,
        }
    }

    pub(crate) fn is_resolving(&self) -> bool {
        self.phase == Phase::Resolving
    }

    /// Start a fresh resolution (mount, sign-in, or explicit re-check).
    pub(crate) fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.phase = Phase::Resolving;
        tracing::debug!(generation = self.generation, "resolution started");
        self.generation
    }

    pub(crate) fn on_event(&mut self, event: AuthEvent) -> EventStep {
        match event {
            AuthEvent::TokenRefreshed => EventStep::Ignore,
            AuthEvent::SignedIn => EventStep::Resolve(self.begin()),
            AuthEvent::SignedOut | AuthEvent::SessionExpired => {
                // Supersede any in-flight resolution: a stale slow profile
                // lookup must not overwrite a newer sign-out.
                self.generation += 1;
                self.phase = Phase::Redirecting;
                EventStep::SignOut
            }
        }
    }

    /// Feed back a pipeline result. Returns `None` when the result is stale
    /// (superseded by a later event) and must be discarded.
    pub(crate) fn on_outcome(&mut self, generation: u64, outcome: PipelineOutcome) -> Option<Applied> {
        if generation != self.generation || self.phase != Phase::Resolving {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale resolution result"
            );
            return None;
        }

        Some(match outcome {
            PipelineOutcome::Unauthenticated => {
                self.phase = Phase::Redirecting;
                Applied::Redirect(Redirect::login())
            }
            PipelineOutcome::Failed(err) => {
                self.phase = Phase::Failed;
                Applied::Failed(err)
            }
            PipelineOutcome::Decided {
                identity,
                profile,
                decision,
            } => match decision {
                Decision::Allow => match profile {
                    Some(profile) => {
                        self.phase = Phase::Ready;
                        Applied::Ready { identity, profile }
                    }
                    // decide() never allows without a profile; fail closed
                    // if a pipeline ever claims otherwise.
                    None => {
                        self.phase = Phase::Redirecting;
                        Applied::Redirect(Redirect::login())
                    }
                },
                Decision::Redirect(redirect) => {
                    self.phase = Phase::Redirecting;
                    Applied::Redirect(redirect)
                }
            },
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateControl {
    Recheck,
    Unmount,
}

/// Control handle for a mounted gate.
#[derive(Debug, Clone)]
pub struct GateHandle {
    control: mpsc::UnboundedSender<GateControl>,
}

impl GateHandle {
    /// Re-run the full resolution pipeline (e.g. retry after a store
    /// failure).
    pub fn recheck(&self) {
        let _ = self.control.send(GateControl::Recheck);
    }

    /// Tear the gate down: unsubscribes from the provider and discards any
    /// in-flight resolution.
    pub fn unmount(&self) {
        let _ = self.control.send(GateControl::Unmount);
    }
}

/// A gate guarding one protected area.
///
/// Construct with the area's role constraint, then [`mount`](Self::mount) it.
#[derive(Debug)]
pub struct SessionGate<P, S, N> {
    identity: IdentityService<P>,
    profiles: ProfileResolver<S>,
    navigator: Arc<N>,
    allowed_roles: Option<Vec<Role>>,
}

/// A running gate: the task, its control handle, and the read side of the
/// published state.
#[derive(Debug)]
pub struct MountedGate {
    handle: GateHandle,
    state: watch::Receiver<GateState>,
    pub task: JoinHandle<()>,
}

impl MountedGate {
    pub fn handle(&self) -> GateHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> watch::Receiver<GateState> {
        self.state.clone()
    }

    /// Consumer view of the current state (see [`AccessSnapshot`]).
    pub fn snapshot(&self) -> AccessSnapshot {
        AccessSnapshot::from(&*self.state.borrow())
    }
}

impl<P, S, N> SessionGate<P, S, N>
where
    P: IdentityProvider + 'static,
    S: ProfileStore + 'static,
    N: Navigator + 'static,
{
    pub fn new(
        identity: IdentityService<P>,
        profiles: ProfileResolver<S>,
        navigator: Arc<N>,
    ) -> Self {
        Self {
            identity,
            profiles,
            navigator,
            allowed_roles: None,
        }
    }

    /// Constrain the protected area to a set of roles. Without this, any
    /// active profile is allowed.
    pub fn allow_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.allowed_roles = Some(roles.into_iter().collect());
        self
    }

    /// Mount the gate: subscribe to provider events, start the first
    /// resolution, and publish state until unmounted.
    pub fn mount(self) -> MountedGate {
        let (state_tx, state_rx) = watch::channel(GateState::Loading);
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let events = self.identity.subscribe();
        let task = tokio::spawn(run(self, state_tx, control_rx, events));
        MountedGate {
            handle: GateHandle {
                control: control_tx,
            },
            state: state_rx,
            task,
        }
    }
}

type PipelineFuture = Pin<Box<dyn Future<Output = (u64, PipelineOutcome)> + Send>>;

fn idle() -> PipelineFuture {
    Box::pin(std::future::pending())
}

async fn run<P, S, N>(
    gate: SessionGate<P, S, N>,
    state: watch::Sender<GateState>,
    mut control: mpsc::UnboundedReceiver<GateControl>,
    mut events: AuthEvents,
) where
    P: IdentityProvider + 'static,
    S: ProfileStore + 'static,
    N: Navigator + 'static,
{
    let mut machine = GateMachine::new();

    // Mount kicks off the first resolution immediately.
    let mut inflight = start(machine.begin(), &gate);

    loop {
        tokio::select! {
            biased;

            maybe = control.recv() => match maybe {
                Some(GateControl::Recheck) => {
                    let _ = state.send(GateState::Loading);
                    inflight = start(machine.begin(), &gate);
                }
                // A dropped handle unmounts, same as an explicit request.
                Some(GateControl::Unmount) | None => break,
            },

            maybe = events.next() => match maybe {
                Some(event) => match machine.on_event(event) {
                    EventStep::Ignore => {}
                    EventStep::Resolve(generation) => {
                        let _ = state.send(GateState::Loading);
                        inflight = start(generation, &gate);
                    }
                    EventStep::SignOut => {
                        // Drop the in-flight resolution: sign-out wins.
                        inflight = idle();
                        let redirect = Redirect::login();
                        gate.navigator.navigate_to(&redirect.target);
                        let _ = state.send(GateState::Redirecting(redirect));
                    }
                },
                // Provider subscription torn down.
                None => break,
            },

            (generation, outcome) = &mut inflight, if machine.is_resolving() => {
                inflight = idle();
                if let Some(applied) = machine.on_outcome(generation, outcome) {
                    apply(applied, &gate, &state);
                }
            }
        }
    }

    tracing::debug!("session gate unmounted");
}

fn start<P, S, N>(generation: u64, gate: &SessionGate<P, S, N>) -> PipelineFuture
where
    P: IdentityProvider + 'static,
    S: ProfileStore + 'static,
    N: Navigator,
{
    let identity = gate.identity.clone();
    let profiles = gate.profiles.clone();
    let allowed = gate.allowed_roles.clone();
    Box::pin(async move { (generation, resolve_pipeline(identity, profiles, allowed).await) })
}

/// One resolution cycle: session lookup, profile resolution, routing
/// decision — sequential, since the profile lookup needs the subject id.
async fn resolve_pipeline<P, S>(
    identity: IdentityService<P>,
    profiles: ProfileResolver<S>,
    allowed: Option<Vec<Role>>,
) -> PipelineOutcome
where
    P: IdentityProvider,
    S: ProfileStore,
{
    let authenticated = match identity.current_session().await {
        Ok(Some(authenticated)) => authenticated,
        Ok(None) => return PipelineOutcome::Unauthenticated,
        Err(err) => return PipelineOutcome::Failed(GateError::Provider(err.to_string())),
    };

    let subject = authenticated.identity.subject;
    match profiles.resolve(subject).await {
        Ok(profile) => {
            let decision = decide(Some(&profile), allowed.as_deref());
            PipelineOutcome::Decided {
                identity: authenticated.identity,
                profile: Some(profile),
                decision,
            }
        }
        // Eventual-consistency gap right after signup: fall back to the
        // safest default route, never a restricted area, never an error.
        Err(ResolveError::ProfileMissing) => {
            let decision = decide(None, allowed.as_deref());
            PipelineOutcome::Decided {
                identity: authenticated.identity,
                profile: None,
                decision,
            }
        }
        Err(ResolveError::StoreUnavailable(msg)) => {
            PipelineOutcome::Failed(GateError::Store(msg))
        }
    }
}

fn apply<P, S, N>(applied: Applied, gate: &SessionGate<P, S, N>, state: &watch::Sender<GateState>)
where
    P: IdentityProvider + 'static,
    S: ProfileStore,
    N: Navigator,
{
    match applied {
        Applied::Ready { identity, profile } => {
            tracing::info!(subject = %identity.subject, role = %profile.role, "access granted");
            let sign_out = SignOutHandle::new(Arc::new(gate.identity.clone()));
            let context = AccessContext::new(identity, profile, sign_out);
            let _ = state.send(GateState::Ready(context));
        }
        Applied::Redirect(redirect) => {
            tracing::info!(target = %redirect.target, "access redirected");
            gate.navigator.navigate_to(&redirect.target);
            let _ = state.send(GateState::Redirecting(redirect));
        }
        Applied::Failed(err) => {
            tracing::warn!(error = %err, "resolution failed; awaiting retry");
            let _ = state.send(GateState::Failed(err));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
