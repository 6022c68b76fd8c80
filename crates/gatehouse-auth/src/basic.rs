//! HTTP Basic authentication method.
//!
//! Credentials come from `Authorization: Basic <base64(user:password)>` and
//! are verified by one of two strategies:
//!
//! - **local** (default): the listener's statically configured `users` map,
//!   comparing `salted_hash(password, username)` with the stored hash;
//! - **shared store**: a [`UserVerifier`] owning the authoritative store,
//!   selected by `hashed-password` (the client sends the salted hash) or
//!   `shared-store` (the client sends the plaintext).
//!
//! A request without Basic credentials is declined so other methods can
//! look at it. Present but wrong credentials are rejected with an error that
//! does not tell an unknown user from a bad password.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use gatehouse_config::UserDef;
use http::HeaderMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::credentials::BasicCredentials;
use crate::error::AuthError;
use crate::hash::verify_salted;
use crate::identity::Identity;
use crate::options::{AuthOptions, ListenerAuth};
use crate::result::{Challenge, Verdict, Verification};
use crate::traits::{AuthHandler, UserVerifier};

/// Registration name of the Basic method.
pub const METHOD: &str = "basic";
/// Scheme advertised in `WWW-Authenticate`.
pub const SCHEME: &str = "Basic";

/// Options of the Basic method.
///
/// ```toml
/// options = { hashed-password = true }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BasicOptions {
    /// The password in the request is already `salted_hash(password, username)`;
    /// verification goes to the shared store.
    #[serde(default)]
    pub hashed_password: bool,
    /// Verify plaintext passwords against the shared store instead of the
    /// listener's users.
    #[serde(default)]
    pub shared_store: bool,
}

impl BasicOptions {
    #[inline]
    fn uses_shared_store(&self) -> bool {
        self.hashed_password || self.shared_store
    }
}

impl AuthOptions for BasicOptions {}

/// Configuration snapshot installed by `init`.
#[derive(Debug)]
struct BasicState {
    score: i32,
    options: Arc<BasicOptions>,
    users: Arc<HashMap<String, UserDef>>,
}

/// The Basic authentication method.
pub struct BasicHandler {
    verifier: Arc<dyn UserVerifier>,
    state: ArcSwapOption<BasicState>,
}

impl BasicHandler {
    /// Create an unconfigured handler that uses `verifier` as the shared store.
    pub fn new(verifier: Arc<dyn UserVerifier>) -> Self {
        Self {
            verifier,
            state: ArcSwapOption::empty(),
        }
    }

    /// Build the state `init` publishes; `None` when the method is off for this listener.
    fn snapshot(listener: &ListenerAuth) -> Result<Option<Arc<BasicState>>, AuthError> {
        let Some(settings) = listener.enabled_method(METHOD) else {
            return Ok(None);
        };
        let Some(raw) = settings.options.as_ref() else {
            return Ok(None);
        };
        let options = raw
            .downcast::<BasicOptions>()
            .ok_or_else(|| AuthError::ConfigMismatch {
                method: METHOD.to_owned(),
                found: raw.type_name(),
                expected: std::any::type_name::<BasicOptions>(),
            })?;
        Ok(Some(Arc::new(BasicState {
            score: settings.score,
            options,
            users: Arc::clone(&listener.users),
        })))
    }

    async fn check_shared(
        &self,
        id: u64,
        creds: &BasicCredentials,
        options: &BasicOptions,
    ) -> Verdict {
        let user = creds.username();
        let verification = match self
            .verifier
            .verify(user, creds.password(), options.hashed_password)
            .await
        {
            Ok(v) => v,
            Err(err) => {
                info!(id, method = METHOD, user, reason = %err, "basic login error");
                return Verdict::Reject(err);
            }
        };
        match verification {
            Verification::Valid(found) => Verdict::Accept(Identity::new(
                METHOD,
                user,
                found.groups,
                found.extra,
            )),
            failed => {
                let reason = failed.failure_reason().unwrap_or("rejected");
                info!(id, method = METHOD, user, reason, "basic login error");
                Verdict::Reject(AuthError::invalid(user))
            }
        }
    }

    fn check_local(
        &self,
        id: u64,
        creds: &BasicCredentials,
        users: &HashMap<String, UserDef>,
    ) -> Verdict {
        let user = creds.username();
        let Some(def) = users.get(user) else {
            info!(id, method = METHOD, user, reason = "user not found", "basic login error");
            return Verdict::Reject(AuthError::invalid(user));
        };
        if !verify_salted(creds.password(), user, &def.password) {
            info!(id, method = METHOD, user, reason = "illegal password", "basic login error");
            return Verdict::Reject(AuthError::invalid(user));
        }
        Verdict::Accept(Identity::new(
            METHOD,
            user,
            def.groups.clone(),
            Default::default(),
        ))
    }
}

// Cannot derive Debug due to dyn UserVerifier
impl std::fmt::Debug for BasicHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicHandler")
            .field("state", &self.state.load_full())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthHandler for BasicHandler {
    fn name(&self) -> &'static str {
        METHOD
    }

    fn init(&self, listener: &ListenerAuth) -> Result<(), AuthError> {
        let next = match Self::snapshot(listener) {
            Ok(next) => next,
            Err(err) => {
                self.state.store(None);
                return Err(err);
            }
        };
        if let Some(state) = &next {
            debug!(listener = %listener.name, method = METHOD, score = state.score, "method enabled");
        }
        // One store: a concurrent check sees either the old or the new state
        self.state.store(next);
        Ok(())
    }

    fn enabled(&self) -> bool {
        self.state.load().is_some()
    }

    fn score(&self) -> i32 {
        self.state.load_full().map_or(0, |s| s.score)
    }

    fn www_auth_header(&self) -> Challenge {
        Challenge {
            scheme: SCHEME,
            with_realm: true,
        }
    }

    async fn check(&self, id: u64, _prefix: &str, path: &str, headers: &HeaderMap) -> Verdict {
        let Some(state) = self.state.load_full() else {
            return Verdict::Decline;
        };
        let Some(creds) = BasicCredentials::from_headers(headers) else {
            debug!(id, path, "no basic credentials");
            return Verdict::Decline;
        };

        if state.options.uses_shared_store() {
            self.check_shared(id, &creds, &state.options).await
        } else {
            self.check_local(id, &creds, &state.users)
        }
    }
}
