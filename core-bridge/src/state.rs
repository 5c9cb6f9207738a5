//! Bridge authentication state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the authentication bridge.
///
/// # State Transitions
///
/// ```text
/// Idle -> Authenticating -> {Authenticated, Failed, Cancelled}
///              ^                   |
///              |                   v
///              +---- (re-auth) ----+
/// ```
///
/// Any state transitions to `Idle` on explicit logout, and a user
/// cancellation settles in `Idle` so a fresh attempt is immediately legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BridgeState {
    /// No session and no login attempt in flight.
    #[default]
    Idle,
    /// A provider login flow is in progress.
    Authenticating,
    /// The provider produced a usable session.
    Authenticated,
    /// The last login attempt failed with a provider error.
    Failed,
    /// The last login attempt was dismissed by the user.
    Cancelled,
}

impl BridgeState {
    /// Whether a login attempt is currently in flight.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BridgeState::Authenticating)
    }

    /// Whether the bridge holds an authenticated session.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, BridgeState::Authenticated)
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeState::Idle => write!(f, "idle"),
            BridgeState::Authenticating => write!(f, "authenticating"),
            BridgeState::Authenticated => write!(f, "authenticated"),
            BridgeState::Failed => write!(f, "failed"),
            BridgeState::Cancelled => write!(f, "cancelled"),
        }
    }
}
