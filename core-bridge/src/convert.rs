//! Session-to-credential conversion.
//!
//! Validates a provider session snapshot and converts it into the canonical
//! [`CredentialMap`]. The converter refuses to fabricate defaults: a session
//! missing its identifier or token is a provider contract violation, not a
//! valid empty result.

use crate::error::{AuthError, Result};
use bridge_traits::credentials::{CredentialMap, KEY_ACCESS_TOKEN, KEY_ID};
use bridge_traits::provider::ProviderSession;

/// Converts a provider session into the canonical credential map.
///
/// # Errors
///
/// [`AuthError::MalformedSession`] if the session's user identifier or
/// access token is empty.
pub fn credential_map_from_session(session: &ProviderSession) -> Result<CredentialMap> {
    if session.user_id.is_empty() {
        return Err(AuthError::MalformedSession { field: KEY_ID });
    }
    if session.access_token.is_empty() {
        return Err(AuthError::MalformedSession {
            field: KEY_ACCESS_TOKEN,
        });
    }
    Ok(CredentialMap::new(
        &session.user_id,
        &session.access_token,
        session.expires_at,
    ))
}
