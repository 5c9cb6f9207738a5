//! Pending Authentication Request
//!
//! One in-flight `authenticate` call: a single-fire result slot plus the
//! caller's handle onto it. The pair is created together; the bridge keeps
//! the [`PendingAuthentication`] and the caller keeps the
//! [`AuthenticationHandle`]. Completing consumes the pending side, so a
//! request can never receive a second terminal outcome.

use crate::error::{AuthError, Result};
use bridge_traits::credentials::CredentialMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::warn;
use uuid::Uuid;

/// Bridge-side half of an in-flight `authenticate` call.
#[derive(Debug)]
pub(crate) struct PendingAuthentication {
    request_id: Uuid,
    sender: oneshot::Sender<Result<CredentialMap>>,
}

impl PendingAuthentication {
    /// Creates a pending request and the caller's handle for it.
    pub(crate) fn new() -> (Self, AuthenticationHandle) {
        let (sender, receiver) = oneshot::channel();
        let request_id = Uuid::new_v4();
        (
            Self { request_id, sender },
            AuthenticationHandle { receiver },
        )
    }

    /// Identifier correlating completions with this request.
    pub(crate) fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Delivers the terminal outcome to the caller.
    ///
    /// A caller that dropped its handle simply never observes the result;
    /// that is not an error.
    pub(crate) fn complete(self, result: Result<CredentialMap>) {
        if self.sender.send(result).is_err() {
            warn!(request_id = %self.request_id, "authentication result dropped: caller no longer awaiting");
        }
    }
}

/// Caller-side handle resolving to the outcome of one `authenticate` call.
///
/// Resolves exactly once with either a credential map, a cancellation, or a
/// typed provider error. If the bridge disappears before completing (it
/// never does so deliberately), the handle resolves with
/// [`AuthError::Cancelled`] rather than pending forever.
#[derive(Debug)]
pub struct AuthenticationHandle {
    receiver: oneshot::Receiver<Result<CredentialMap>>,
}

impl Future for AuthenticationHandle {
    type Output = Result<CredentialMap>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(AuthError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}
