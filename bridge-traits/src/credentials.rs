//! Credential Map Wire Type
//!
//! The provider-agnostic credential bundle handed to the generic
//! authentication framework. The wire shape is a fixed contract: a string
//! map with exactly the keys [`KEY_ID`], [`KEY_ACCESS_TOKEN`] and
//! [`KEY_EXPIRATION_DATE`]. No provider-internal fields leak through.
//!
//! ## Determinism
//!
//! The map is backed by a `BTreeMap` and timestamps use a fixed
//! millisecond-precision format, so converting the same session twice yields
//! byte-identical serialized output.
//!
//! ## Security
//!
//! The access token is never logged; the `Debug` implementation redacts it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key for the provider user identifier.
pub const KEY_ID: &str = "id";

/// Key for the provider access token.
pub const KEY_ACCESS_TOKEN: &str = "access_token";

/// Key for the token expiration timestamp.
pub const KEY_EXPIRATION_DATE: &str = "expiration_date";

/// Sentinel emitted for tokens that do not expire.
///
/// A stable distant-future timestamp rather than an omitted key, preserving
/// the downstream framework's expectation that the field always exists.
pub const NON_EXPIRING: &str = "4001-01-01T00:00:00.000Z";

/// Millisecond-precision ISO-8601 format used for expiration timestamps.
const PRECISE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Formats a timestamp with millisecond precision.
///
/// # Examples
///
/// ```
/// use bridge_traits::credentials::format_expiration;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
/// assert_eq!(format_expiration(ts), "2024-06-01T12:30:00.000Z");
/// ```
pub fn format_expiration(timestamp: DateTime<Utc>) -> String {
    timestamp.format(PRECISE_FORMAT).to_string()
}

/// Parses a timestamp previously produced by [`format_expiration`].
///
/// Returns `None` for malformed input.
pub fn parse_expiration(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, PRECISE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Immutable provider-agnostic credential bundle.
///
/// Built from a provider session by [`CredentialMap::new`]; the constructor
/// is total and pure for well-formed input (validating that the identifier
/// and token are present is the caller's job, not this type's).
///
/// # Examples
///
/// ```
/// use bridge_traits::credentials::{CredentialMap, NON_EXPIRING};
///
/// let credentials = CredentialMap::new("12345", "abcXYZ", None);
/// assert_eq!(credentials.user_id(), Some("12345"));
/// assert_eq!(credentials.access_token(), Some("abcXYZ"));
/// assert_eq!(credentials.expiration_date(), Some(NON_EXPIRING));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialMap(BTreeMap<String, String>);

impl CredentialMap {
    /// Converts a provider-native session triple into the canonical map.
    ///
    /// `expires_at = None` means the token does not expire; the
    /// [`NON_EXPIRING`] sentinel is emitted so the key is always present.
    ///
    /// # Arguments
    ///
    /// * `user_id` - provider user identifier
    /// * `access_token` - provider access token
    /// * `expires_at` - expiration timestamp, or `None` for non-expiring
    pub fn new(
        user_id: impl Into<String>,
        access_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut map = BTreeMap::new();
        map.insert(KEY_ID.to_string(), user_id.into());
        map.insert(KEY_ACCESS_TOKEN.to_string(), access_token.into());
        map.insert(
            KEY_EXPIRATION_DATE.to_string(),
            match expires_at {
                Some(timestamp) => format_expiration(timestamp),
                None => NON_EXPIRING.to_string(),
            },
        );
        Self(map)
    }

    /// Looks up a field by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The provider user identifier, if present and non-empty.
    pub fn user_id(&self) -> Option<&str> {
        self.get(KEY_ID).filter(|v| !v.is_empty())
    }

    /// The access token, if present and non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.get(KEY_ACCESS_TOKEN).filter(|v| !v.is_empty())
    }

    /// The raw expiration field, if present.
    pub fn expiration_date(&self) -> Option<&str> {
        self.get(KEY_EXPIRATION_DATE)
    }

    /// Whether the map carries the non-expiring sentinel.
    pub fn is_non_expiring(&self) -> bool {
        self.expiration_date() == Some(NON_EXPIRING)
    }

    /// The parsed expiration timestamp.
    ///
    /// Returns `None` for non-expiring credentials and for malformed or
    /// missing expiration fields.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expiration_date()?;
        if raw == NON_EXPIRING {
            return None;
        }
        parse_expiration(raw)
    }

    /// Whether the credentials carry an expiration date in the past.
    ///
    /// Non-expiring credentials and malformed expiration fields are not
    /// considered expired; malformed identifier/token fields are caught by
    /// the accessors instead.
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at <= Utc::now(),
            None => false,
        }
    }

    /// Number of fields in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the map, returning the underlying key/value pairs.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for CredentialMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for CredentialMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialMap")
            .field("id", &self.get(KEY_ID))
            .field("access_token", &self.get(KEY_ACCESS_TOKEN).map(|_| "[REDACTED]"))
            .field("expiration_date", &self.get(KEY_EXPIRATION_DATE))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_converter_emits_exact_wire_shape() {
        let credentials = CredentialMap::new("12345", "abcXYZ", None);
        let inner = credentials.clone().into_inner();

        assert_eq!(inner.len(), 3);
        assert_eq!(inner.get(KEY_ID).map(String::as_str), Some("12345"));
        assert_eq!(
            inner.get(KEY_ACCESS_TOKEN).map(String::as_str),
            Some("abcXYZ")
        );
        assert_eq!(
            inner.get(KEY_EXPIRATION_DATE).map(String::as_str),
            Some(NON_EXPIRING)
        );
    }

    #[test]
    fn test_converter_is_deterministic() {
        let expires = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        let first = CredentialMap::new("user", "token", Some(expires));
        let second = CredentialMap::new("user", "token", Some(expires));

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_non_expiring_emits_sentinel_not_omitted_key() {
        let credentials = CredentialMap::new("user", "token", None);

        assert!(credentials.is_non_expiring());
        assert_eq!(credentials.expiration_date(), Some(NON_EXPIRING));
        assert!(credentials.expires_at().is_none());
        assert!(!credentials.is_expired());
    }

    #[test]
    fn test_expiration_round_trip_millisecond_precision() {
        let expires = Utc
            .with_ymd_and_hms(2024, 12, 31, 23, 59, 59)
            .unwrap()
            .checked_add_signed(Duration::milliseconds(123))
            .unwrap();

        let formatted = format_expiration(expires);
        assert_eq!(formatted, "2024-12-31T23:59:59.123Z");
        assert_eq!(parse_expiration(&formatted), Some(expires));
    }

    #[test]
    fn test_parse_expiration_rejects_malformed_input() {
        assert!(parse_expiration("not a timestamp").is_none());
        assert!(parse_expiration("2024-12-31").is_none());
        assert!(parse_expiration("").is_none());
    }

    #[test]
    fn test_is_expired() {
        let past = CredentialMap::new("u", "t", Some(Utc::now() - Duration::hours(1)));
        let future = CredentialMap::new("u", "t", Some(Utc::now() + Duration::hours(1)));

        assert!(past.is_expired());
        assert!(!future.is_expired());
    }

    #[test]
    fn test_accessors_filter_empty_values() {
        let credentials = CredentialMap::new("", "", None);

        assert!(credentials.user_id().is_none());
        assert!(credentials.access_token().is_none());
    }

    #[test]
    fn test_serialization_is_transparent() {
        let credentials = CredentialMap::new("12345", "abcXYZ", None);
        let json = serde_json::to_string(&credentials).unwrap();

        assert_eq!(
            json,
            format!(
                "{{\"access_token\":\"abcXYZ\",\"expiration_date\":\"{}\",\"id\":\"12345\"}}",
                NON_EXPIRING
            )
        );

        let deserialized: CredentialMap = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, credentials);
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let credentials = CredentialMap::new("12345", "secret_token", None);
        let debug_str = format!("{:?}", credentials);

        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret_token"));
    }
}
