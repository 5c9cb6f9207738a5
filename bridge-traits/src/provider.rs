//! Identity Provider SDK Contract
//!
//! The callback-driven surface of the third-party identity provider SDK, as
//! the bridge sees it. The SDK is an opaque dependency: it owns its own
//! session/token machinery and delivers results on threads outside the
//! bridge's control. Implementations are typically thread-affine and are
//! driven through the affinity proxy rather than called directly.
//!
//! ## Completion discipline
//!
//! Login results are delivered through [`LoginCompletion`], a single-fire
//! continuation. Resolving it consumes it, so double resolution is
//! unrepresentable; dropping it without resolving fires a provider failure
//! so no pending request is ever silently abandoned.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Provider error code reported when a completion is dropped unresolved.
pub const COMPLETION_DROPPED_CODE: i32 = -1;

/// Host application launch payload, forwarded verbatim into the SDK.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Bundle/package identifier of the application that launched us, if any.
    pub source_application: Option<String>,
    /// Remaining platform-specific launch entries.
    pub extras: HashMap<String, String>,
}

/// An inbound platform lifecycle event routed to the bridge.
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    /// Application finished launching.
    Launch(LaunchOptions),
    /// Application was asked to open a URL (OAuth redirect, deep link).
    OpenUrl(Url),
    /// Application returned to the foreground.
    Resume,
}

/// Requested permission set for a login attempt.
///
/// Read and publish permissions are disjoint in intent; keeping them
/// disjoint is a documented caller contract, not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginRequest {
    /// Read-only permissions (e.g., `public_profile`, `email`).
    pub read_permissions: Vec<String>,
    /// Publish permissions (e.g., `publish_actions`).
    pub publish_permissions: Vec<String>,
}

impl LoginRequest {
    /// A request for the given read permissions.
    ///
    /// # Examples
    ///
    /// ```
    /// use bridge_traits::provider::LoginRequest;
    ///
    /// let request = LoginRequest::with_read(["public_profile"]);
    /// assert_eq!(request.read_permissions, vec!["public_profile"]);
    /// assert!(request.publish_permissions.is_empty());
    /// ```
    pub fn with_read<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            read_permissions: permissions.into_iter().map(Into::into).collect(),
            publish_permissions: Vec::new(),
        }
    }

    /// A request for the given publish permissions.
    pub fn with_publish<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            read_permissions: Vec::new(),
            publish_permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Total number of requested permissions.
    pub fn permission_count(&self) -> usize {
        self.read_permissions.len() + self.publish_permissions.len()
    }
}

/// Snapshot of the provider's session state.
///
/// The underlying session is owned by the SDK and may be invalidated behind
/// the bridge's back (e.g., the user revokes access from the provider's own
/// settings). A snapshot is therefore point-in-time data, never a liveness
/// guarantee.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSession {
    /// Provider user identifier.
    pub user_id: String,
    /// Provider access token.
    pub access_token: String,
    /// Token expiration, or `None` for tokens that do not expire.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ProviderSession {
    /// Whether the session's token has passed its expiration date.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now(),
            None => false,
        }
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSession")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Terminal outcome of one provider login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The user granted access; the SDK produced a session.
    Success(ProviderSession),
    /// The user dismissed the provider dialog. Not a failure.
    Cancelled,
    /// The SDK reported an error (network, permission denial, configuration).
    Failure {
        /// Provider error code, preserved verbatim for diagnostics.
        code: i32,
        /// Human-readable description from the SDK.
        message: String,
    },
}

/// Single-fire continuation for a login attempt.
///
/// Resolving consumes the completion; a completion that is dropped without
/// being resolved fires [`LoginOutcome::Failure`] with
/// [`COMPLETION_DROPPED_CODE`] so the caller's pending request always
/// receives exactly one terminal outcome.
pub struct LoginCompletion {
    callback: Option<Box<dyn FnOnce(LoginOutcome) + Send>>,
}

impl LoginCompletion {
    /// Wraps a callback to be fired exactly once.
    pub fn new(callback: impl FnOnce(LoginOutcome) + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Fires the completion with the given outcome.
    pub fn resolve(mut self, outcome: LoginOutcome) {
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }

    /// Shorthand for a successful login.
    pub fn success(self, session: ProviderSession) {
        self.resolve(LoginOutcome::Success(session));
    }

    /// Shorthand for a user-cancelled login.
    pub fn cancelled(self) {
        self.resolve(LoginOutcome::Cancelled);
    }

    /// Shorthand for a failed login.
    pub fn failure(self, code: i32, message: impl Into<String>) {
        self.resolve(LoginOutcome::Failure {
            code,
            message: message.into(),
        });
    }
}

impl Drop for LoginCompletion {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(LoginOutcome::Failure {
                code: COMPLETION_DROPPED_CODE,
                message: "login completion dropped without being resolved".to_string(),
            });
        }
    }
}

impl fmt::Debug for LoginCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCompletion")
            .field("resolved", &self.callback.is_none())
            .finish()
    }
}

/// The third-party identity provider SDK.
///
/// Implementations are driven by the bridge through its affinity proxy: all
/// calls execute serially on the SDK's designated thread, so implementations
/// may use single-threaded interior mutability (`RefCell`) for their session
/// state. Login completions may be fired from any thread the SDK chooses.
pub trait IdentityProvider: 'static {
    /// Stable identifier of this provider's authentication type, as
    /// registered with the consuming framework (e.g., `"facebook"`).
    const AUTHENTICATION_TYPE: &'static str;

    /// Forwards the application-launch lifecycle event into the SDK.
    ///
    /// Returns whether the SDK consumed the event.
    fn activate(&self, options: &LaunchOptions) -> bool;

    /// Forwards an open-URL event (OAuth redirect) into the SDK.
    ///
    /// Returns whether the URL belonged to this provider's session machinery.
    fn handle_open_url(&self, url: &Url) -> bool;

    /// Notifies the SDK that the application returned to the foreground.
    fn resume(&self);

    /// Starts a login flow for the requested permissions.
    ///
    /// The SDK must eventually resolve `completion` with exactly one
    /// [`LoginOutcome`]; dropping it unresolved is reported as a failure.
    fn log_in(&self, request: LoginRequest, completion: LoginCompletion);

    /// Invalidates the current session, if any.
    fn log_out(&self);

    /// Point-in-time snapshot of the active session, if one exists.
    fn current_session(&self) -> Option<ProviderSession>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_completion_fires_once() {
        let (tx, rx) = mpsc::channel();
        let completion = LoginCompletion::new(move |outcome| tx.send(outcome).unwrap());

        completion.cancelled();

        assert_eq!(rx.recv().unwrap(), LoginOutcome::Cancelled);
        // The completion was consumed by resolve; the channel must now be closed.
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_dropped_completion_reports_failure() {
        let (tx, rx) = mpsc::channel();
        let completion = LoginCompletion::new(move |outcome| tx.send(outcome).unwrap());

        drop(completion);

        match rx.recv().unwrap() {
            LoginOutcome::Failure { code, .. } => assert_eq!(code, COMPLETION_DROPPED_CODE),
            other => panic!("expected Failure, got {:?}", other),
        }
    }

    #[test]
    fn test_resolved_completion_does_not_fire_on_drop() {
        let (tx, rx) = mpsc::channel();
        let completion = LoginCompletion::new(move |outcome| tx.send(outcome).unwrap());

        completion.failure(7, "denied");

        match rx.recv().unwrap() {
            LoginOutcome::Failure { code, message } => {
                assert_eq!(code, 7);
                assert_eq!(message, "denied");
            }
            other => panic!("expected Failure, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_session_expiry() {
        let expired = ProviderSession {
            user_id: "u".to_string(),
            access_token: "t".to_string(),
            expires_at: Some(Utc::now() - chrono::Duration::minutes(1)),
        };
        let non_expiring = ProviderSession {
            user_id: "u".to_string(),
            access_token: "t".to_string(),
            expires_at: None,
        };

        assert!(expired.is_expired());
        assert!(!non_expiring.is_expired());
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = ProviderSession {
            user_id: "u".to_string(),
            access_token: "super_secret".to_string(),
            expires_at: None,
        };
        let debug_str = format!("{:?}", session);

        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super_secret"));
    }

    #[test]
    fn test_login_request_constructors() {
        let read = LoginRequest::with_read(["public_profile", "email"]);
        assert_eq!(read.permission_count(), 2);

        let publish = LoginRequest::with_publish(["publish_actions"]);
        assert_eq!(publish.read_permissions.len(), 0);
        assert_eq!(publish.publish_permissions, vec!["publish_actions"]);
    }
}
