//! # Bridge Contracts
//!
//! Shared contracts between the authentication bridge, the host application,
//! the third-party identity provider SDK, and the generic authentication
//! framework that consumes the bridge's output.
//!
//! ## Overview
//!
//! This crate defines the seams of the system as plain types and traits so
//! that each side can be implemented (and tested) independently:
//!
//! - [`IdentityProvider`](provider::IdentityProvider) - the callback-driven
//!   provider SDK the bridge drives (login, logout, lifecycle forwarding)
//! - [`AuthenticationDelegate`](delegate::AuthenticationDelegate) - the
//!   capability the bridge publishes to the consuming framework
//! - [`CredentialMap`](credentials::CredentialMap) - the provider-agnostic
//!   credential bundle handed to the framework, with a fixed wire shape
//!
//! ## Thread Safety
//!
//! The provider SDK is assumed to be thread-affine: it is only required to be
//! `Send` so it can be moved onto the thread that will own it. Everything
//! that crosses threads (completions, sessions, credential maps) is `Send`.

pub mod credentials;
pub mod delegate;
pub mod provider;

pub use credentials::{CredentialMap, KEY_ACCESS_TOKEN, KEY_EXPIRATION_DATE, KEY_ID};
pub use delegate::AuthenticationDelegate;
pub use provider::{
    IdentityProvider, LaunchOptions, LoginCompletion, LoginOutcome, LoginRequest, PlatformEvent,
    ProviderSession,
};
