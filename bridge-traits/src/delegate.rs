//! Authentication Framework Delegate
//!
//! The capability the bridge publishes to the generic authentication
//! framework. The framework discovers it by static typing: anything handed
//! to the framework's registry implements [`AuthenticationDelegate`].

use crate::credentials::CredentialMap;
use async_trait::async_trait;

/// Delegate capability consumed by the generic authentication framework.
///
/// One delegate is registered per authentication type; the framework routes
/// credential maps with a matching type back to the delegate that issued
/// them.
#[async_trait]
pub trait AuthenticationDelegate: Send + Sync {
    /// Stable string identifier for this authentication type.
    fn authentication_type(&self) -> &'static str;

    /// Whether `credentials` still represents a usable session.
    ///
    /// A local consistency check only - no network calls. Returns `false`
    /// (never an error) when the map is stale, malformed, or no active
    /// provider session exists.
    async fn restore_authentication(&self, credentials: &CredentialMap) -> bool;

    /// Notification that a previously active principal's authentication can
    /// no longer be restored. Default is a no-op.
    async fn on_authentication_revoked(&self, _user_id: &str) {}
}
