//! Authentication error types.

use gatehouse_core::errors::{
    ERROR_BACKEND, ERROR_CONFIG, ERROR_CONFIG_MISMATCH, ERROR_CREDENTIAL_INVALID,
};

/// Authentication error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Options payload type differs from the type the method registered.
    #[error(r#"options for method "{method}" is "{found}", expected "{expected}""#)]
    ConfigMismatch {
        method: String,
        found: &'static str,
        expected: &'static str,
    },

    /// Method configuration could not be decoded or validated.
    #[error("config: {0}")]
    Config(String),

    /// Credentials were present but the user is unknown or the password is wrong.
    #[error(r#"user "{user}" not found or illegal password"#)]
    Invalid { user: String },

    /// Shared user store error (network, remote service, etc.).
    #[error("backend error: {0}")]
    Backend(String),
}

impl AuthError {
    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    #[inline]
    pub(crate) fn invalid(user: &str) -> Self {
        Self::Invalid {
            user: user.to_owned(),
        }
    }

    /// Error kind label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::ConfigMismatch { .. } => ERROR_CONFIG_MISMATCH,
            AuthError::Config(_) => ERROR_CONFIG,
            AuthError::Invalid { .. } => ERROR_CREDENTIAL_INVALID,
            AuthError::Backend(_) => ERROR_BACKEND,
        }
    }

    /// Whether this error must abort listener startup.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuthError::ConfigMismatch { .. } | AuthError::Config(_))
    }
}
