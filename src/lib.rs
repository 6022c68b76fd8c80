//! # gatehouse
//!
//! Pluggable HTTP authentication dispatch.
//!
//! A listener runs a chain of authentication methods ordered by score;
//! each method accepts, declines or rejects a request's credentials.
//! HTTP Basic ships as the stock method, verifying against either the
//! listener's own users or a shared user store.
//!
//! ## Crates
//!
//! - [`gatehouse_core`] - Default values and error labels
//! - [`gatehouse_config`] - Configuration loading and validation
//! - [`gatehouse_metrics`] - Dispatch counters
//! - [`gatehouse_auth`] - Methods, registry and dispatcher

pub use gatehouse_auth as auth;
pub use gatehouse_config as config;
pub use gatehouse_core as core;
pub use gatehouse_metrics as metrics;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use gatehouse_auth::{
        AuthError, AuthHandler, AuthRuntime, BasicHandler, Dispatcher, Identity, MemoryVerifier,
        Outcome, Registry, ReloadableVerifier, UserVerifier, Verdict,
    };
    pub use gatehouse_config::{Config, load_config, validate_config};
}
