//! Configuration loading, validation and CLI overrides for gatehouse.
//!
//! A config file holds one or more listeners, each with its own set of
//! authentication methods and statically configured users, plus the
//! shared user store and logging settings.
//!
//! ```toml
//! [[listeners]]
//! name = "api"
//! realm = "internal"
//!
//! [listeners.auth.methods.basic]
//! enabled = true
//! score = 10
//!
//! [listeners.auth.users.alice]
//! password = "<salted hash>"
//! groups = ["admin"]
//! ```

mod cli;
mod defaults;
mod loader;
mod types;
mod validate;

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, load_config};
pub use types::*;
pub use validate::validate_config;
