//! Pluggable HTTP authentication for gatehouse.
//!
//! Each listener runs a chain of authentication methods. Every method
//! answers a request with a [`Verdict`]: accept with an [`Identity`],
//! decline so the next method can look, or reject with an [`AuthError`].
//! The [`Dispatcher`] tries enabled methods in descending score order and
//! merges their `WWW-Authenticate` challenges.
//!
//! Methods are listed in an explicit [`Registry`]; the stock one contains
//! HTTP Basic ([`BasicHandler`]). [`AuthRuntime`] holds the dispatchers of
//! every listener in a config and swaps them on reload.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use gatehouse_auth::{BasicCredentials, Dispatcher, MemoryVerifier, Registry, salted_hash};
//! use gatehouse_config::{AuthMethodConfig, ListenerConfig, UserDef};
//! use http::{HeaderMap, header::AUTHORIZATION};
//!
//! # async fn example() -> Result<(), gatehouse_auth::AuthError> {
//! let mut listener = ListenerConfig {
//!     name: "api".into(),
//!     realm: "internal".into(),
//!     auth: Default::default(),
//! };
//! listener.auth.methods.insert(
//!     "basic".into(),
//!     AuthMethodConfig { enabled: true, ..Default::default() },
//! );
//! listener.auth.users.insert(
//!     "alice".into(),
//!     UserDef { password: salted_hash("s3cret", "alice"), groups: Default::default() },
//! );
//!
//! let registry = Registry::with_basic(Arc::new(MemoryVerifier::new()));
//! let dispatcher = Dispatcher::new(&registry);
//! dispatcher.init(&registry.prepare(&listener)?)?;
//!
//! let mut headers = HeaderMap::new();
//! let value = BasicCredentials::header_value("alice", "s3cret");
//! headers.insert(AUTHORIZATION, value.parse().unwrap());
//!
//! let outcome = dispatcher.authenticate(1, "/", "/", &headers).await;
//! assert_eq!(outcome.identity().map(|i| i.user()), Some("alice"));
//! # Ok(())
//! # }
//! ```

mod basic;
mod credentials;
mod dispatcher;
mod error;
mod hash;
mod identity;
mod memory;
mod options;
mod registry;
mod reloadable;
mod result;
mod runtime;
mod traits;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "cli")]
pub mod cli;

pub use basic::{BasicHandler, BasicOptions};
pub use credentials::BasicCredentials;
pub use dispatcher::{Dispatcher, Outcome};
pub use error::AuthError;
pub use hash::{matches_hash, salted_hash, verify_salted};
pub use identity::Identity;
pub use memory::MemoryVerifier;
pub use options::{AuthOptions, ListenerAuth, MethodOptions, MethodSettings};
pub use registry::Registry;
pub use reloadable::ReloadableVerifier;
pub use result::{Challenge, StoreUser, Verdict, Verification};
pub use runtime::AuthRuntime;
pub use traits::{AuthHandler, UserVerifier};

#[cfg(feature = "cli")]
pub use cli::AuthArgs;
