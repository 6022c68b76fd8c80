//! Hot-reloadable user verification wrapper.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::AuthError;
use crate::result::Verification;
use crate::traits::UserVerifier;

/// A wrapper that allows hot-swapping the underlying user store.
///
/// Uses `parking_lot::RwLock` which doesn't poison on panic.
///
/// # Example
/// ```
/// use gatehouse_auth::{MemoryVerifier, ReloadableVerifier};
///
/// let store = ReloadableVerifier::new(MemoryVerifier::from_passwords([("alice", "old")]));
///
/// // Later, reload with new users
/// store.reload(MemoryVerifier::from_passwords([("alice", "new")]));
/// ```
pub struct ReloadableVerifier {
    inner: RwLock<Arc<dyn UserVerifier>>,
}

impl ReloadableVerifier {
    /// Create a new reloadable store with the given initial verifier.
    pub fn new<V: UserVerifier + 'static>(verifier: V) -> Self {
        Self {
            inner: RwLock::new(Arc::new(verifier)),
        }
    }

    /// Create from an already shared verifier.
    pub fn from_arc(verifier: Arc<dyn UserVerifier>) -> Self {
        Self {
            inner: RwLock::new(verifier),
        }
    }

    /// Replace the verifier.
    ///
    /// In-flight verifications complete against the old verifier, new ones
    /// use the new verifier.
    pub fn reload<V: UserVerifier + 'static>(&self, verifier: V) {
        *self.inner.write() = Arc::new(verifier);
    }

    /// Replace the verifier with a pre-wrapped Arc.
    pub fn reload_arc(&self, verifier: Arc<dyn UserVerifier>) {
        *self.inner.write() = verifier;
    }

    /// Get a clone of the current verifier Arc.
    #[inline]
    pub fn get(&self) -> Arc<dyn UserVerifier> {
        self.inner.read().clone()
    }
}

// Cannot derive Debug due to dyn UserVerifier
impl std::fmt::Debug for ReloadableVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadableVerifier").finish_non_exhaustive()
    }
}

#[async_trait]
impl UserVerifier for ReloadableVerifier {
    async fn verify(
        &self,
        username: &str,
        password: &str,
        hashed: bool,
    ) -> Result<Verification, AuthError> {
        // Clone the Arc so we don't hold the lock across await
        let verifier = self.get();
        verifier.verify(username, password, hashed).await
    }
}
