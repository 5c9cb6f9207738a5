//! # Authentication Bridge
//!
//! Orchestrates the provider SDK's login/logout lifecycle and reconciles
//! its callback-delivered session changes with the caller's pending
//! asynchronous result.
//!
//! ## Concurrency model
//!
//! Callers of [`AuthenticationBridge::authenticate`] may originate on any
//! thread; the provider SDK delivers completions on threads outside the
//! bridge's control. All SDK interaction is funneled through the affinity
//! proxy (the SDK is thread-affine), and all pending/session bookkeeping is
//! serialized behind one internal lock. At most one login attempt is in
//! flight per bridge instance; a second concurrent attempt fails fast with
//! [`AuthError::AlreadyInProgress`] rather than queuing behind the
//! provider's single dialog.

use crate::convert::credential_map_from_session;
use crate::error::{AuthError, Result};
use crate::events::{AuthEvent, EventBus};
use crate::pending::{AuthenticationHandle, PendingAuthentication};
use crate::state::BridgeState;
use crate::token_cache::TokenCache;
use async_trait::async_trait;
use bridge_traits::credentials::CredentialMap;
use bridge_traits::delegate::AuthenticationDelegate;
use bridge_traits::provider::{
    IdentityProvider, LaunchOptions, LoginCompletion, LoginOutcome, LoginRequest, PlatformEvent,
};
use core_affinity::Receptionist;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

/// The authentication bridge.
///
/// Owns the provider SDK behind a [`Receptionist`], tracks at most one
/// pending login attempt, and publishes itself to the consuming framework
/// as an [`AuthenticationDelegate`]. Cheap to clone; clones share state.
pub struct AuthenticationBridge<P: IdentityProvider> {
    shared: Arc<Shared<P>>,
}

impl<P: IdentityProvider> Clone for AuthenticationBridge<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<P: IdentityProvider> {
    provider: Receptionist<P>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<BridgeState>,
    events: EventBus,
    token_cache: TokenCache,
}

struct Inner {
    state: BridgeState,
    pending: Option<PendingAuthentication>,
}

impl<P: IdentityProvider> Shared<P> {
    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, inner: &mut Inner, state: BridgeState) {
        if inner.state != state {
            debug!(from = %inner.state, to = %state, "bridge state transition");
            inner.state = state;
            let _ = self.state_tx.send(state);
        }
    }

    /// Resolves the pending request matching `request_id` with the
    /// provider's outcome. Completions for requests that are no longer
    /// pending (logout raced the callback, or a duplicate delivery) are
    /// logged and dropped, never allowed to overwrite a prior outcome.
    fn complete(self: &Arc<Self>, request_id: Uuid, outcome: LoginOutcome) {
        let (pending, result, event) = {
            let mut inner = self.lock_inner();
            let pending = match inner.pending.take() {
                Some(pending) if pending.request_id() == request_id => pending,
                Some(other) => {
                    warn!(%request_id, "discarding completion for a superseded request");
                    inner.pending = Some(other);
                    return;
                }
                None => {
                    warn!(%request_id, "discarding completion with no pending request");
                    return;
                }
            };

            match outcome {
                LoginOutcome::Success(session) => match credential_map_from_session(&session) {
                    Ok(credentials) => {
                        info!(%request_id, user_id = %session.user_id, "authentication succeeded");
                        self.token_cache.update(&session);
                        self.set_state(&mut inner, BridgeState::Authenticated);
                        (
                            pending,
                            Ok(credentials),
                            AuthEvent::Authenticated {
                                user_id: session.user_id,
                            },
                        )
                    }
                    Err(err) => {
                        error!(%request_id, error = %err, "provider returned a malformed session");
                        self.set_state(&mut inner, BridgeState::Failed);
                        let message = err.to_string();
                        (
                            pending,
                            Err(err),
                            AuthEvent::AuthenticationFailed { message },
                        )
                    }
                },
                LoginOutcome::Cancelled => {
                    info!(%request_id, "authentication cancelled by user");
                    // A cancellation is terminal for the request, not for
                    // the bridge: it settles back in Idle.
                    self.set_state(&mut inner, BridgeState::Cancelled);
                    self.set_state(&mut inner, BridgeState::Idle);
                    (
                        pending,
                        Err(AuthError::Cancelled),
                        AuthEvent::AuthenticationCancelled,
                    )
                }
                LoginOutcome::Failure { code, message } => {
                    error!(%request_id, code, %message, "provider reported a login failure");
                    self.set_state(&mut inner, BridgeState::Failed);
                    (
                        pending,
                        Err(AuthError::Provider {
                            code,
                            message: message.clone(),
                        }),
                        AuthEvent::AuthenticationFailed { message },
                    )
                }
            }
        };

        let _ = self.events.emit(event);
        pending.complete(result);
    }
}

impl<P: IdentityProvider> AuthenticationBridge<P> {
    /// Creates a bridge around the provider held by `provider`.
    pub fn new(provider: Receptionist<P>) -> Self {
        let (state_tx, _) = watch::channel(BridgeState::Idle);
        Self {
            shared: Arc::new(Shared {
                provider,
                inner: Mutex::new(Inner {
                    state: BridgeState::Idle,
                    pending: None,
                }),
                state_tx,
                events: EventBus::default(),
                token_cache: TokenCache::new(),
            }),
        }
    }

    /// Starts a provider login flow for the requested permissions.
    ///
    /// Returns immediately with a handle that resolves to the credential
    /// map once the provider's callback arrives. Read and publish
    /// permissions are disjoint in intent; keeping them disjoint is the
    /// caller's contract.
    ///
    /// # Errors
    ///
    /// Synchronous failures only:
    ///
    /// - [`AuthError::AlreadyInProgress`] - another attempt is in flight;
    ///   the in-flight attempt is unaffected.
    /// - [`AuthError::AffinityUnavailable`] - the provider thread could not
    ///   accept the dispatch.
    ///
    /// Cancellation and provider errors are delivered through the handle,
    /// never thrown from here.
    #[instrument(skip_all, fields(
        read = request.read_permissions.len(),
        publish = request.publish_permissions.len(),
    ))]
    pub fn authenticate(&self, request: LoginRequest) -> Result<AuthenticationHandle> {
        let (pending, handle) = PendingAuthentication::new();
        let request_id = pending.request_id();

        {
            let mut inner = self.shared.lock_inner();
            if inner.state.is_in_progress() || inner.pending.is_some() {
                warn!("rejecting concurrent authentication attempt");
                return Err(AuthError::AlreadyInProgress);
            }
            inner.pending = Some(pending);
            self.shared.set_state(&mut inner, BridgeState::Authenticating);
        }
        let _ = self.shared.events.emit(AuthEvent::Authenticating {
            read_permissions: request.read_permissions.clone(),
            publish_permissions: request.publish_permissions.clone(),
        });

        // The completion may fire from any thread the SDK chooses; dropping
        // it unresolved fires a provider failure, so the pending request is
        // guaranteed exactly one terminal outcome.
        let completion = {
            let shared = Arc::clone(&self.shared);
            LoginCompletion::new(move |outcome| shared.complete(request_id, outcome))
        };

        info!(%request_id, "starting provider login flow");
        if let Err(err) = self
            .shared
            .provider
            .invoke(move |sdk| sdk.log_in(request, completion))
        {
            error!(%request_id, error = %err, "could not dispatch login to provider thread");
            // The completion's drop guard may already have consumed the
            // pending request; reclaim it only if it is still ours.
            let mut inner = self.shared.lock_inner();
            if inner
                .pending
                .as_ref()
                .map(PendingAuthentication::request_id)
                == Some(request_id)
            {
                inner.pending = None;
            }
            self.shared.set_state(&mut inner, BridgeState::Idle);
            return Err(err.into());
        }

        Ok(handle)
    }

    /// Tears down the provider session and resets the bridge to `Idle`.
    ///
    /// An in-flight `authenticate` resolves with [`AuthError::Cancelled`];
    /// local state is reset even if the provider thread is unreachable, in
    /// which case the affinity error is still reported.
    #[instrument(skip(self))]
    pub fn log_out(&self) -> Result<()> {
        let pending = {
            let mut inner = self.shared.lock_inner();
            let pending = inner.pending.take();
            self.shared.set_state(&mut inner, BridgeState::Idle);
            pending
        };
        if let Some(pending) = pending {
            info!(request_id = %pending.request_id(), "cancelling in-flight authentication on logout");
            pending.complete(Err(AuthError::Cancelled));
        }
        self.shared.token_cache.clear();

        let dispatched = self.shared.provider.invoke(|sdk| sdk.log_out());
        let _ = self.shared.events.emit(AuthEvent::LoggedOut);
        info!("logged out");
        dispatched.map_err(Into::into)
    }

    /// Forwards the application-launch event into the provider SDK.
    pub fn on_launch(&self, options: &LaunchOptions) -> Result<bool> {
        let options = options.clone();
        Ok(self
            .shared
            .provider
            .invoke(move |sdk| sdk.activate(&options))?)
    }

    /// Forwards an open-URL event into the provider SDK.
    ///
    /// Returns whether the URL was consumed by the provider's session
    /// machinery.
    pub fn on_open_url(&self, url: &Url) -> Result<bool> {
        let url = url.clone();
        Ok(self
            .shared
            .provider
            .invoke(move |sdk| sdk.handle_open_url(&url))?)
    }

    /// Routes an inbound platform event to the matching SDK handler.
    pub fn handle_platform_callback(&self, event: PlatformEvent) -> Result<bool> {
        match event {
            PlatformEvent::Launch(options) => self.on_launch(&options),
            PlatformEvent::OpenUrl(url) => self.on_open_url(&url),
            PlatformEvent::Resume => {
                self.shared.provider.invoke(|sdk| sdk.resume())?;
                Ok(true)
            }
        }
    }

    /// Current bridge state.
    pub fn state(&self) -> BridgeState {
        self.shared.lock_inner().state
    }

    /// Watch channel observing bridge state transitions.
    pub fn watch_state(&self) -> watch::Receiver<BridgeState> {
        self.shared.state_tx.subscribe()
    }

    /// Subscribes to authentication lifecycle events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AuthEvent> {
        self.shared.events.subscribe()
    }

    /// User identifier of the most recently authenticated principal.
    pub fn current_user_id(&self) -> Option<String> {
        self.shared.token_cache.user_id()
    }

    /// Local-only check that `credentials` still matches the provider's
    /// active session. Never performs network calls; any failure to verify
    /// is `false`, not an error.
    fn session_matches(&self, credentials: &CredentialMap) -> bool {
        let Some(user_id) = credentials.user_id() else {
            debug!("credential map has no user identifier");
            return false;
        };
        if credentials.access_token().is_none() {
            debug!(user_id, "credential map has no access token");
            return false;
        }
        if credentials.is_expired() {
            debug!(user_id, "credential map has expired");
            return false;
        }

        let session = match self.shared.provider.invoke(|sdk| sdk.current_session()) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "provider thread unavailable during restore check");
                return false;
            }
        };

        match session {
            Some(session) if session.user_id == user_id && !session.is_expired() => true,
            Some(session) => {
                debug!(
                    expected = user_id,
                    actual = %session.user_id,
                    "active provider session does not match credentials"
                );
                false
            }
            None => {
                self.revoke_if_cached(user_id);
                false
            }
        }
    }

    /// Publishes a revocation if `user_id` was the active cached principal.
    fn revoke_if_cached(&self, user_id: &str) {
        if self.shared.token_cache.user_id().as_deref() == Some(user_id) {
            info!(user_id, "provider session gone for active principal, revoking");
            self.shared.token_cache.clear();
            let _ = self.shared.events.emit(AuthEvent::AuthenticationRevoked {
                user_id: user_id.to_string(),
            });
        }
    }
}

#[async_trait]
impl<P: IdentityProvider> AuthenticationDelegate for AuthenticationBridge<P> {
    fn authentication_type(&self) -> &'static str {
        P::AUTHENTICATION_TYPE
    }

    async fn restore_authentication(&self, credentials: &CredentialMap) -> bool {
        self.session_matches(credentials)
    }

    async fn on_authentication_revoked(&self, user_id: &str) {
        info!(user_id, "authentication revoked by framework");
        self.revoke_if_cached(user_id);
    }
}
