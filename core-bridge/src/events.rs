//! Authentication Event Bus
//!
//! Decoupled notification of authentication state changes using
//! `tokio::sync::broadcast`. Subscribers observe the bridge without holding
//! a reference into its internals; emitting to a bus with no subscribers is
//! not an error the bridge cares about.

use tokio::sync::broadcast::{self, error::SendError};

/// Default number of events buffered per subscriber.
const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

/// Authentication lifecycle events published by the bridge.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A provider login flow was started.
    Authenticating {
        /// Requested read permissions.
        read_permissions: Vec<String>,
        /// Requested publish permissions.
        publish_permissions: Vec<String>,
    },
    /// The provider produced a usable session.
    Authenticated {
        /// Provider user identifier.
        user_id: String,
    },
    /// The login attempt failed.
    AuthenticationFailed {
        /// Human-readable description of the failure.
        message: String,
    },
    /// The user dismissed the provider dialog.
    AuthenticationCancelled,
    /// The session was torn down by an explicit logout.
    LoggedOut,
    /// A previously active principal's session can no longer be restored.
    AuthenticationRevoked {
        /// Provider user identifier of the revoked principal.
        user_id: String,
    },
}

/// Broadcast channel for [`AuthEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl EventBus {
    /// Creates an event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event; an error
    /// means there were none, which callers are free to ignore.
    pub fn emit(&self, event: AuthEvent) -> Result<usize, SendError<AuthEvent>> {
        self.sender.send(event)
    }

    /// Registers a new subscriber.
    ///
    /// Only events emitted after subscription are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_emitted_events() {
        let bus = EventBus::default();
        let mut receiver = bus.subscribe();

        bus.emit(AuthEvent::Authenticated {
            user_id: "12345".to_string(),
        })
        .unwrap();

        match receiver.recv().await.unwrap() {
            AuthEvent::Authenticated { user_id } => assert_eq!(user_id, "12345"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_an_ignorable_error() {
        let bus = EventBus::default();
        assert!(bus.emit(AuthEvent::AuthenticationCancelled).is_err());
    }

    #[tokio::test]
    async fn test_each_subscriber_sees_every_event() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.emit(AuthEvent::LoggedOut).unwrap();

        assert!(matches!(first.recv().await.unwrap(), AuthEvent::LoggedOut));
        assert!(matches!(second.recv().await.unwrap(), AuthEvent::LoggedOut));
    }
}
