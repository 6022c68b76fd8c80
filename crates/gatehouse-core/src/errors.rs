//! Error kind labels for metrics and logging.
//!
//! These constants keep failure classification consistent across crates.

/// Options payload does not match the method's registered type.
pub const ERROR_CONFIG_MISMATCH: &str = "config_mismatch";
/// Configuration could not be loaded, decoded or validated.
pub const ERROR_CONFIG: &str = "config";
/// Credentials for the scheme were present but invalid.
pub const ERROR_CREDENTIAL_INVALID: &str = "credential_invalid";
/// The shared user store failed or was unreachable.
pub const ERROR_BACKEND: &str = "backend";
