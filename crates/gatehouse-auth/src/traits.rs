//! Authentication method and user verification traits.

use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;

use crate::error::AuthError;
use crate::options::ListenerAuth;
use crate::result::{Challenge, Verdict, Verification};

/// Shared user verification service.
///
/// Implementations must be thread-safe (`Send + Sync`) as they may be
/// called concurrently from multiple requests.
#[async_trait]
pub trait UserVerifier: Send + Sync {
    /// Verify a user's password.
    ///
    /// # Arguments
    /// * `username` - The user-id from the request
    /// * `password` - Plaintext password, or `salted_hash(password, username)` when `hashed`
    /// * `hashed` - Whether `password` is already hashed
    ///
    /// # Returns
    /// * `Ok(Verification)` - The store answered (valid, unknown user or bad password)
    /// * `Err(AuthError)` - The store could not answer
    async fn verify(
        &self,
        username: &str,
        password: &str,
        hashed: bool,
    ) -> Result<Verification, AuthError>;
}

/// Blanket implementation for `Arc<V>` where `V: UserVerifier`.
///
/// This allows passing `Arc<dyn UserVerifier>` directly to functions expecting `impl UserVerifier`.
#[async_trait]
impl<V: UserVerifier + ?Sized> UserVerifier for Arc<V> {
    #[inline]
    async fn verify(
        &self,
        username: &str,
        password: &str,
        hashed: bool,
    ) -> Result<Verification, AuthError> {
        (**self).verify(username, password, hashed).await
    }
}

/// Blanket implementation for `Box<V>` where `V: UserVerifier`.
#[async_trait]
impl<V: UserVerifier + ?Sized> UserVerifier for Box<V> {
    #[inline]
    async fn verify(
        &self,
        username: &str,
        password: &str,
        hashed: bool,
    ) -> Result<Verification, AuthError> {
        (**self).verify(username, password, hashed).await
    }
}

/// An HTTP authentication method.
///
/// A handler is bound to one listener by [`init`](Self::init) and then
/// consulted by the [`Dispatcher`](crate::Dispatcher) for every request.
/// `check` only reads the snapshot installed by the latest `init`, so it may
/// run concurrently with other checks and with a reload.
#[async_trait]
pub trait AuthHandler: Send + Sync {
    /// Registration name, also used as [`Identity::method`](crate::Identity::method).
    fn name(&self) -> &'static str;

    /// Bind to a listener's configuration.
    ///
    /// Resets to unconfigured first. Fails with [`AuthError::ConfigMismatch`]
    /// if the options type is not the one this method registered.
    fn init(&self, listener: &ListenerAuth) -> Result<(), AuthError>;

    /// Whether the last `init` found an enabled entry for this method.
    fn enabled(&self) -> bool;

    /// Ordering key; higher is tried first. Only meaningful when enabled.
    fn score(&self) -> i32;

    /// Challenge contributed to a 401 response.
    fn www_auth_header(&self) -> Challenge;

    /// Examine a request.
    ///
    /// # Arguments
    /// * `id` - Request id, used for log correlation
    /// * `prefix` - Path prefix the listener matched
    /// * `path` - Request path below the prefix
    /// * `headers` - Request headers
    async fn check(&self, id: u64, prefix: &str, path: &str, headers: &HeaderMap) -> Verdict;
}
