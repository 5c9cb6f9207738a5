//! In-Memory Token Cache
//!
//! Remembers the last session triple the provider handed us so the bridge
//! can answer "who was signed in" without a hop to the provider thread, and
//! can tell a revoked principal apart from one that was never signed in.
//!
//! Persistence is deliberately out of scope; the cache lives and dies with
//! the bridge instance. Token values are never logged and the `Debug`
//! implementation redacts them.

use bridge_traits::provider::ProviderSession;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// The cached session triple.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedCredentials {
    /// Provider user identifier.
    pub user_id: String,
    /// Provider access token.
    pub access_token: String,
    /// Token expiration, or `None` for non-expiring tokens.
    pub expires_at: Option<DateTime<Utc>>,
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for CachedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedCredentials")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Thread-safe cache of the most recent provider session.
#[derive(Debug, Default)]
pub struct TokenCache {
    inner: Mutex<Option<CachedCredentials>>,
}

impl TokenCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the session as the current principal.
    pub fn update(&self, session: &ProviderSession) {
        debug!(user_id = %session.user_id, "caching provider session");
        *self.lock() = Some(CachedCredentials {
            user_id: session.user_id.clone(),
            access_token: session.access_token.clone(),
            expires_at: session.expires_at,
        });
    }

    /// The cached triple, if any.
    pub fn get(&self) -> Option<CachedCredentials> {
        self.lock().clone()
    }

    /// The cached principal's user identifier, if any.
    pub fn user_id(&self) -> Option<String> {
        self.lock().as_ref().map(|cached| cached.user_id.clone())
    }

    /// Clears the cache. Returns whether anything was cached.
    pub fn clear(&self) -> bool {
        let cleared = self.lock().take().is_some();
        if cleared {
            debug!("cleared cached provider session");
        }
        cleared
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CachedCredentials>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: &str) -> ProviderSession {
        ProviderSession {
            user_id: user_id.to_string(),
            access_token: "secret_token".to_string(),
            expires_at: None,
        }
    }

    #[test]
    fn test_update_and_get() {
        let cache = TokenCache::new();
        assert!(cache.get().is_none());

        cache.update(&session("u1"));

        let cached = cache.get().unwrap();
        assert_eq!(cached.user_id, "u1");
        assert_eq!(cached.access_token, "secret_token");
        assert_eq!(cache.user_id().as_deref(), Some("u1"));
    }

    #[test]
    fn test_update_replaces_previous_principal() {
        let cache = TokenCache::new();
        cache.update(&session("u1"));
        cache.update(&session("u2"));

        assert_eq!(cache.user_id().as_deref(), Some("u2"));
    }

    #[test]
    fn test_clear() {
        let cache = TokenCache::new();
        cache.update(&session("u1"));

        assert!(cache.clear());
        assert!(cache.get().is_none());
        assert!(!cache.clear());
    }

    #[test]
    fn test_debug_redacts_token() {
        let cache = TokenCache::new();
        cache.update(&session("u1"));

        let debug_str = format!("{:?}", cache.get().unwrap());
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret_token"));
    }
}
