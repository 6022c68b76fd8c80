//! Verification and dispatch result types.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::AuthError;
use crate::identity::Identity;

/// A user as known to the shared user store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreUser {
    pub user: String,
    pub groups: BTreeSet<String>,
    /// Store-specific claims passed through to the identity.
    pub extra: BTreeMap<String, String>,
}

impl StoreUser {
    /// Create a store user with no groups or claims.
    #[inline]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Answer of a user verification service.
///
/// `UnknownUser` and `BadPassword` are kept apart for audit logging only;
/// callers must not expose the difference to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid(StoreUser),
    UnknownUser,
    BadPassword,
}

impl Verification {
    /// Audit reason for a failed verification.
    pub fn failure_reason(&self) -> Option<&'static str> {
        match self {
            Verification::Valid(_) => None,
            Verification::UnknownUser => Some("user not found"),
            Verification::BadPassword => Some("illegal password"),
        }
    }
}

/// Static `WWW-Authenticate` challenge descriptor of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub scheme: &'static str,
    pub with_realm: bool,
}

/// Tri-state decision of an authentication method.
#[derive(Debug)]
pub enum Verdict {
    /// Credentials were valid; the chain stops here.
    Accept(Identity),
    /// This method's scheme does not apply; ask the next method.
    Decline,
    /// Credentials for this scheme were present but invalid; the chain stops here.
    Reject(AuthError),
}

impl Verdict {
    /// Whether the dispatcher should try the next method.
    #[inline]
    pub fn try_next(&self) -> bool {
        matches!(self, Verdict::Decline)
    }

    #[inline]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Verdict::Accept(identity) => Some(identity),
            _ => None,
        }
    }

    #[inline]
    pub fn error(&self) -> Option<&AuthError> {
        match self {
            Verdict::Reject(err) => Some(err),
            _ => None,
        }
    }

    /// Split into the `(identity, try_next, error)` triple.
    pub fn into_parts(self) -> (Option<Identity>, bool, Option<AuthError>) {
        match self {
            Verdict::Accept(identity) => (Some(identity), false, None),
            Verdict::Decline => (None, true, None),
            Verdict::Reject(err) => (None, false, Some(err)),
        }
    }
}
