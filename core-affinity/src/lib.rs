//! Thread-affinity proxy for the federated identity bridge.
//!
//! Some third-party SDKs only tolerate calls from one specific thread
//! (typically the thread that owns the UI). This crate generalizes that
//! requirement into an explicit executor bound to one worker: a
//! [`Receptionist`] owns a dedicated thread and the target object living on
//! it, and forwards every call to that thread with a synchronous blocking
//! round-trip, from whatever thread the caller happens to be on.
//!
//! # Guarantees
//!
//! - Calls are delivered to the target in FIFO order and never execute
//!   concurrently - the worker runs one forwarded call at a time.
//! - A call made from the designated thread itself executes in-line, so
//!   re-entrant invocations cannot deadlock.
//! - Every wait is bounded; a worker that cannot respond in time yields
//!   [`AffinityError::Unavailable`] instead of blocking the caller forever.
//!
//! # Examples
//!
//! ```
//! use core_affinity::Receptionist;
//!
//! struct Greeter {
//!     name: String,
//! }
//!
//! let receptionist = Receptionist::spawn(Greeter {
//!     name: "bridge".to_string(),
//! });
//!
//! let greeting = receptionist
//!     .invoke(|greeter| format!("hello, {}", greeter.name))
//!     .unwrap();
//! assert_eq!(greeting, "hello, bridge");
//! ```

pub mod error;
pub mod receptionist;

pub use error::AffinityError;
pub use receptionist::Receptionist;
