//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Listener Defaults
// ============================================================================

/// Default realm advertised in `WWW-Authenticate` challenges.
pub const DEFAULT_REALM: &str = "gatehouse";
/// Default score for a configured method.
pub const DEFAULT_METHOD_SCORE: i32 = 0;
/// Methods are disabled unless a config entry turns them on.
pub const DEFAULT_METHOD_ENABLED: bool = false;

// ============================================================================
// Credential Defaults
// ============================================================================

/// Length of a hex-encoded salted password hash (SHA-512 = 64 bytes).
pub const PASSWORD_HASH_HEX_LEN: usize = 128;

// ============================================================================
// Shared Store Defaults
// ============================================================================

/// Default request timeout for a remote verification service, in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Accepted log formats.
pub const LOG_FORMATS: [&str; 3] = ["json", "pretty", "compact"];
/// Accepted log outputs.
pub const LOG_OUTPUTS: [&str; 2] = ["stdout", "stderr"];
