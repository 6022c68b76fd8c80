//! The authenticated principal.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Principal produced when a method accepts a request.
///
/// Immutable once built; `method` is always the accepting method's
/// registration name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    method: String,
    user: String,
    groups: BTreeSet<String>,
    extra: BTreeMap<String, String>,
}

impl Identity {
    /// Build an identity for the method registered as `method`.
    pub fn new(
        method: &'static str,
        user: impl Into<String>,
        groups: BTreeSet<String>,
        extra: BTreeMap<String, String>,
    ) -> Self {
        Self {
            method: method.to_owned(),
            user: user.into(),
            groups,
            extra,
        }
    }

    /// Name of the method that authenticated the request.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[inline]
    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    /// Method-specific claims.
    #[inline]
    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    #[inline]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}
