//! RFC 7617 Basic credential parsing.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::HeaderMap;
use http::header::AUTHORIZATION;
use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, SecretString};

const SCHEME: &str = "basic";

/// Username and password taken from an `Authorization: Basic` header.
///
/// The password is zeroized when the value is dropped.
pub struct BasicCredentials {
    username: String,
    password: SecretString,
}

impl BasicCredentials {
    /// Extract credentials from the first `Authorization` header.
    ///
    /// Returns `None` when the header is missing, uses another scheme, or is
    /// malformed (bad base64, not UTF-8, no colon).
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        Self::parse(value)
    }

    /// Parse a raw `Authorization` header value.
    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case(SCHEME) {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let mut decoded = String::from_utf8(decoded).ok()?;
        // Split on the first colon: passwords may contain colons, user-ids may not
        let parsed = decoded
            .split_once(':')
            .map(|(username, password)| Self {
                username: username.to_owned(),
                password: SecretString::from(password.to_owned()),
            });
        decoded.zeroize();
        parsed
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Render an `Authorization` header value for these credentials.
    pub fn header_value(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
