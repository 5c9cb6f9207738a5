//! # Authentication Bridge
//!
//! Drives a callback-style federated identity provider SDK through its
//! login/logout lifecycle and presents the result to a generic pluggable
//! authentication framework as a uniform credential map.
//!
//! ## Overview
//!
//! The bridge owns the provider SDK behind a thread-affinity proxy (the SDK
//! may only be called from one designated thread), converts the SDK's native
//! session into the provider-agnostic [`CredentialMap`] wire shape, and
//! registers itself with the framework as an
//! [`AuthenticationDelegate`](bridge_traits::AuthenticationDelegate).
//!
//! ## Features
//!
//! - Asynchronous `authenticate` parameterized by read/publish permissions
//! - Exactly-once completion of every pending request (success, cancellation
//!   or typed provider error - never an unresolved caller)
//! - Fail-fast rejection of concurrent login attempts
//! - Local-only restore checks against the live provider session
//! - Auth state observation via a watch channel and a broadcast event bus
//!
//! ## Usage
//!
//! ```no_run
//! use bridge_traits::provider::LoginRequest;
//! use core_affinity::Receptionist;
//! use core_bridge::AuthenticationBridge;
//! # use bridge_traits::provider::{IdentityProvider, LaunchOptions, LoginCompletion};
//! # struct Sdk;
//! # impl IdentityProvider for Sdk {
//! #     const AUTHENTICATION_TYPE: &'static str = "example";
//! #     fn activate(&self, _: &LaunchOptions) -> bool { true }
//! #     fn handle_open_url(&self, _: &url::Url) -> bool { false }
//! #     fn resume(&self) {}
//! #     fn log_in(&self, _: LoginRequest, completion: LoginCompletion) { completion.cancelled() }
//! #     fn log_out(&self) {}
//! #     fn current_session(&self) -> Option<bridge_traits::provider::ProviderSession> { None }
//! # }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // The SDK is constructed lazily on its own designated thread.
//! let bridge = AuthenticationBridge::new(Receptionist::with_factory(|| Sdk));
//!
//! let handle = bridge.authenticate(LoginRequest::with_read(["public_profile"]))?;
//! // ... the provider's callback resolves the handle ...
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod convert;
pub mod error;
pub mod events;
pub mod pending;
pub mod state;
pub mod token_cache;

pub use bridge::AuthenticationBridge;
pub use convert::credential_map_from_session;
pub use error::{AuthError, Result};
pub use events::{AuthEvent, EventBus};
pub use pending::AuthenticationHandle;
pub use state::BridgeState;
pub use token_cache::{CachedCredentials, TokenCache};
