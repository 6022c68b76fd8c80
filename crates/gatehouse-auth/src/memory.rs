//! In-memory user verification service.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use gatehouse_config::UserDef;

use crate::error::AuthError;
use crate::hash::{matches_hash, salted_hash, verify_salted};
use crate::result::{StoreUser, Verification};
use crate::traits::UserVerifier;

/// Shared user store held in process memory.
///
/// This is suitable for small deployments with a fixed set of users.
/// For a store shared between processes, use the HTTP verifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryVerifier {
    /// Map from username to salted hash and groups
    users: HashMap<String, UserDef>,
}

impl MemoryVerifier {
    /// Create a new empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from configured user definitions (pre-hashed passwords).
    pub fn from_users(users: HashMap<String, UserDef>) -> Self {
        Self { users }
    }

    /// Create from plaintext username/password pairs (will be hashed).
    ///
    /// # Example
    /// ```
    /// use gatehouse_auth::MemoryVerifier;
    ///
    /// let store = MemoryVerifier::from_passwords([("alice", "s3cret"), ("bob", "hunter2")]);
    /// assert_eq!(store.len(), 2);
    /// ```
    pub fn from_passwords<I, U, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: AsRef<str>,
    {
        let mut store = Self::new();
        for (user, password) in pairs {
            store.add_password(user, password.as_ref(), BTreeSet::new());
        }
        store
    }

    /// Add a user with a plaintext password.
    pub fn add_password(
        &mut self,
        user: impl Into<String>,
        password: &str,
        groups: BTreeSet<String>,
    ) {
        let user = user.into();
        let hash = salted_hash(password, &user);
        self.users.insert(
            user,
            UserDef {
                password: hash,
                groups,
            },
        );
    }

    /// Add a user with a pre-computed salted hash.
    #[inline]
    pub fn add_user(&mut self, user: impl Into<String>, def: UserDef) {
        self.users.insert(user.into(), def);
    }

    /// Remove a user by name.
    #[inline]
    pub fn remove(&mut self, user: &str) -> bool {
        self.users.remove(user).is_some()
    }

    /// Get the number of registered users.
    #[inline]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check if no users are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[inline]
    pub fn contains(&self, user: &str) -> bool {
        self.users.contains_key(user)
    }
}

#[async_trait]
impl UserVerifier for MemoryVerifier {
    async fn verify(
        &self,
        username: &str,
        password: &str,
        hashed: bool,
    ) -> Result<Verification, AuthError> {
        let Some(def) = self.users.get(username) else {
            return Ok(Verification::UnknownUser);
        };
        let valid = if hashed {
            matches_hash(password, &def.password)
        } else {
            verify_salted(password, username, &def.password)
        };
        if !valid {
            return Ok(Verification::BadPassword);
        }
        Ok(Verification::Valid(StoreUser {
            user: username.to_owned(),
            groups: def.groups.clone(),
            extra: Default::default(),
        }))
    }
}
