//! Configuration type definitions for listeners, auth methods, users, the shared store and logging.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listeners: Vec<ListenerConfig>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One HTTP listener and the authentication methods it accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    pub name: String,
    /// Realm advertised in `WWW-Authenticate` challenges.
    #[serde(default = "default_realm")]
    pub realm: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Per-method settings keyed by method name.
    /// ```toml
    /// [listeners.auth.methods.basic]
    /// enabled = true
    /// score = 10
    /// options = { hashed-password = false }
    /// ```
    #[serde(default)]
    pub methods: HashMap<String, AuthMethodConfig>,

    /// Statically configured users for local verification.
    /// ```toml
    /// [listeners.auth.users.alice]
    /// password = "<salted hash>"
    /// groups = ["admin"]
    /// ```
    #[serde(default)]
    pub users: HashMap<String, UserDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthMethodConfig {
    #[serde(default = "default_method_enabled")]
    pub enabled: bool,
    /// Higher scores are tried first.
    #[serde(default = "default_method_score")]
    pub score: i32,
    /// Method-specific options, decoded by the method registry.
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}

impl Default for AuthMethodConfig {
    fn default() -> Self {
        Self {
            enabled: default_method_enabled(),
            score: default_method_score(),
            options: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDef {
    /// Hex-encoded password hash salted with the username.
    pub password: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

/// Shared user store used by methods that delegate verification.
///
/// Without `http_url` the store is served in-process from `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub users: HashMap<String, UserDef>,
    /// Remote verification service base URL.
    #[serde(default)]
    pub http_url: Option<String>,
    #[serde(default)]
    pub codec: StoreCodec,
    /// Bearer token presented to the remote service.
    #[serde(default)]
    pub node_token: Option<String>,
    #[serde(default = "default_store_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            http_url: None,
            codec: StoreCodec::default(),
            node_token: None,
            timeout_secs: default_store_timeout_secs(),
        }
    }
}

/// Wire codec spoken with a remote verification service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreCodec {
    #[default]
    Json,
    Bincode,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"gatehouse_auth": "debug"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
