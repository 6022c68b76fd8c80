//! Salted password hashing.
//!
//! Stored credentials are `hex(SHA-512(password || salt))` where the salt is
//! the username. Verification always recomputes and compares; there is no way
//! back from a digest to a password.

use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Compute the salted SHA-512 hash and return it as lowercase hex.
///
/// # Example
/// ```
/// use gatehouse_auth::salted_hash;
///
/// let hash = salted_hash("s3cret", "alice");
/// assert_eq!(hash.len(), 128); // SHA-512 = 64 bytes = 128 hex chars
/// ```
#[inline]
pub fn salted_hash(password: &str, salt: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a plaintext password against a stored salted hash.
#[inline]
pub fn verify_salted(password: &str, salt: &str, stored: &str) -> bool {
    matches_hash(&salted_hash(password, salt), stored)
}

/// Compare two hex digests in constant time.
#[inline]
pub fn matches_hash(candidate: &str, stored: &str) -> bool {
    candidate.as_bytes().ct_eq(stored.as_bytes()).into()
}
