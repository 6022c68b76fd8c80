//! Per-listener authentication dispatcher.
//!
//! Tries the enabled methods of a listener in descending score order until
//! one accepts or rejects the request, and merges the methods' challenges
//! into a single `WWW-Authenticate` value.

use std::cmp::Reverse;
use std::sync::Arc;

use arc_swap::ArcSwap;
use http::header::WWW_AUTHENTICATE;
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use tracing::{debug, info};

use crate::error::AuthError;
use crate::identity::Identity;
use crate::options::ListenerAuth;
use crate::registry::Registry;
use crate::result::Verdict;
use crate::traits::AuthHandler;

/// Final decision of a listener's chain for one request.
///
/// Only [`Outcome::Authenticated`] lets the request through; the other two
/// map to `401 Unauthorized` with the chain's merged challenge.
#[derive(Debug)]
pub enum Outcome {
    /// A method accepted the credentials.
    Authenticated(Identity),
    /// A method found credentials for its scheme and refused them.
    Rejected {
        error: AuthError,
        challenge: Option<String>,
    },
    /// No enabled method recognized any credentials.
    Unauthenticated { challenge: Option<String> },
}

impl Outcome {
    /// `200 OK` when authenticated, `401 Unauthorized` otherwise.
    #[inline]
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Authenticated(_) => StatusCode::OK,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// The accepted identity, if any.
    #[inline]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Outcome::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// `WWW-Authenticate` value to send with a 401. Always `None` once
    /// authenticated, and also `None` when the listener has no enabled method.
    #[inline]
    pub fn challenge(&self) -> Option<&str> {
        match self {
            Outcome::Authenticated(_) => None,
            Outcome::Rejected { challenge, .. } | Outcome::Unauthenticated { challenge } => {
                challenge.as_deref()
            }
        }
    }

    /// Build the response head for a request that did not authenticate, or
    /// an empty 200 otherwise.
    ///
    /// The body is always `B::default()`; rejection details stay in the logs.
    pub fn into_response<B: Default>(self) -> Response<B> {
        let mut response = Response::new(B::default());
        *response.status_mut() = self.status();
        if let Some(value) = self.challenge().and_then(|c| HeaderValue::from_str(c).ok()) {
            response.headers_mut().insert(WWW_AUTHENTICATE, value);
        }
        response
    }
}

struct Chain {
    listener: String,
    order: Vec<Arc<dyn AuthHandler>>,
    challenge: Option<String>,
}

impl Chain {
    fn empty(listener: &str) -> Self {
        Self {
            listener: listener.to_owned(),
            order: Vec::new(),
            challenge: None,
        }
    }
}

type HandlerSource = Box<dyn Fn() -> Vec<Arc<dyn AuthHandler>> + Send + Sync>;

/// Authentication dispatcher for one listener.
///
/// Every `init` builds and configures a fresh set of handlers, then swaps
/// them in as a new chain. Handlers of a published chain are never
/// reconfigured, so requests in flight finish on the chain they started with.
pub struct Dispatcher {
    source: HandlerSource,
    chain: ArcSwap<Chain>,
}

impl Dispatcher {
    /// Create a dispatcher over the methods of `registry`.
    pub fn new(registry: &Registry) -> Self {
        let factories = registry.factories();
        Self::with_source(move || factories.iter().map(|factory| factory()).collect())
    }

    /// Create a dispatcher whose handlers come from `source`, called once per
    /// `init`. Ties in score keep the order `source` returns.
    pub fn with_source<F>(source: F) -> Self
    where
        F: Fn() -> Vec<Arc<dyn AuthHandler>> + Send + Sync + 'static,
    {
        Self {
            source: Box::new(source),
            chain: ArcSwap::from_pointee(Chain::empty("")),
        }
    }

    /// Configure fresh handlers for `listener` and publish them as the new chain.
    ///
    /// On error the chain is left empty, so every request is unauthenticated.
    pub fn init(&self, listener: &ListenerAuth) -> Result<(), AuthError> {
        let handlers = (self.source)();
        for handler in &handlers {
            if let Err(err) = handler.init(listener) {
                self.chain.store(Arc::new(Chain::empty(&listener.name)));
                return Err(err);
            }
        }

        let mut order: Vec<_> = handlers.into_iter().filter(|h| h.enabled()).collect();
        order.sort_by_key(|h| Reverse(h.score()));

        let challenge = build_challenge(&order, &listener.realm);
        info!(
            listener = %listener.name,
            methods = ?order.iter().map(|h| h.name()).collect::<Vec<_>>(),
            "authentication chain ready"
        );
        self.chain.store(Arc::new(Chain {
            listener: listener.name.clone(),
            order,
            challenge,
        }));
        Ok(())
    }

    /// Run the chain for one request.
    pub async fn authenticate(
        &self,
        id: u64,
        prefix: &str,
        path: &str,
        headers: &HeaderMap,
    ) -> Outcome {
        let chain = self.chain.load_full();
        for handler in &chain.order {
            match handler.check(id, prefix, path, headers).await {
                Verdict::Accept(identity) => {
                    gatehouse_metrics::record_auth_accept(handler.name());
                    debug!(id, method = handler.name(), user = identity.user(), "authenticated");
                    return Outcome::Authenticated(identity);
                }
                Verdict::Reject(error) => {
                    gatehouse_metrics::record_auth_reject(handler.name(), error.kind());
                    return Outcome::Rejected {
                        error,
                        challenge: chain.challenge.clone(),
                    };
                }
                Verdict::Decline => {}
            }
        }

        gatehouse_metrics::record_auth_unauthenticated(&chain.listener);
        Outcome::Unauthenticated {
            challenge: chain.challenge.clone(),
        }
    }

    /// Current `WWW-Authenticate` value, `None` when no method is enabled.
    pub fn challenge(&self) -> Option<String> {
        self.chain.load().challenge.clone()
    }

    /// Names of the enabled methods in the order they are tried.
    pub fn enabled_methods(&self) -> Vec<&'static str> {
        self.chain.load().order.iter().map(|h| h.name()).collect()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("methods", &self.enabled_methods())
            .finish_non_exhaustive()
    }
}

fn build_challenge(order: &[Arc<dyn AuthHandler>], realm: &str) -> Option<String> {
    let mut schemes: Vec<&str> = Vec::new();
    let mut parts = Vec::new();
    for handler in order {
        let challenge = handler.www_auth_header();
        if schemes.iter().any(|s| s.eq_ignore_ascii_case(challenge.scheme)) {
            continue;
        }
        schemes.push(challenge.scheme);
        if challenge.with_realm {
            parts.push(format!("{} realm=\"{}\"", challenge.scheme, escape_quoted(realm)));
        } else {
            parts.push(challenge.scheme.to_owned());
        }
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn escape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::result::Challenge;

    /// Scripted handler: answers with a fixed verdict and counts its calls.
    struct Scripted {
        name: &'static str,
        scheme: &'static str,
        with_realm: bool,
        score: i32,
        answer: fn(&'static str) -> Verdict,
        enabled: AtomicBool,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(name: &'static str, score: i32, answer: fn(&'static str) -> Verdict) -> Arc<Self> {
            Arc::new(Self {
                name,
                scheme: "Basic",
                with_realm: true,
                score,
                answer,
                enabled: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            })
        }

        fn with_scheme(name: &'static str, scheme: &'static str, with_realm: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                scheme,
                with_realm,
                score: 0,
                answer: |_| Verdict::Decline,
                enabled: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthHandler for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }
        fn init(&self, listener: &ListenerAuth) -> Result<(), AuthError> {
            self.enabled
                .store(listener.enabled_method(self.name).is_some(), Ordering::SeqCst);
            Ok(())
        }
        fn enabled(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }
        fn score(&self) -> i32 {
            self.score
        }
        fn www_auth_header(&self) -> Challenge {
            Challenge {
                scheme: self.scheme,
                with_realm: self.with_realm,
            }
        }
        async fn check(&self, _: u64, _: &str, _: &str, _: &HeaderMap) -> Verdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)(self.name)
        }
    }

    fn accept(name: &'static str) -> Verdict {
        Verdict::Accept(Identity::new(name, "alice", Default::default(), Default::default()))
    }

    fn reject(_: &'static str) -> Verdict {
        Verdict::Reject(AuthError::Invalid {
            user: "alice".into(),
        })
    }

    fn decline(_: &'static str) -> Verdict {
        Verdict::Decline
    }

    fn listener(realm: &str, enabled: &[&str]) -> ListenerAuth {
        let methods = enabled
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    crate::options::MethodSettings {
                        enabled: true,
                        score: 0,
                        options: None,
                    },
                )
            })
            .collect::<HashMap<_, _>>();
        ListenerAuth {
            name: "api".into(),
            realm: realm.into(),
            methods,
            users: Arc::default(),
        }
    }

    /// Dispatcher that re-initializes the same handlers, so tests can count calls.
    fn dispatcher(handlers: &[Arc<Scripted>]) -> Dispatcher {
        let handlers: Vec<Arc<dyn AuthHandler>> = handlers
            .iter()
            .map(|h| Arc::clone(h) as Arc<dyn AuthHandler>)
            .collect();
        Dispatcher::with_source(move || handlers.clone())
    }

    #[tokio::test]
    async fn test_order_by_score() {
        let low = Scripted::new("low", 1, accept);
        let high = Scripted::new("high", 9, accept);
        let d = dispatcher(&[low.clone(), high.clone()]);
        d.init(&listener("r", &["low", "high"])).unwrap();

        assert_eq!(d.enabled_methods(), ["high", "low"]);
        let outcome = d.authenticate(1, "/", "/", &HeaderMap::new()).await;
        assert_eq!(outcome.identity().unwrap().method(), "high");
        assert_eq!(outcome.status(), StatusCode::OK);
        assert_eq!(low.calls(), 0);
    }

    #[tokio::test]
    async fn test_ties_keep_registration_order() {
        let a = Scripted::new("a", 3, decline);
        let b = Scripted::new("b", 3, decline);
        let c = Scripted::new("c", 3, decline);
        let d = dispatcher(&[a, b, c]);
        d.init(&listener("r", &["c", "a", "b"])).unwrap();
        assert_eq!(d.enabled_methods(), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_decline_falls_through() {
        let first = Scripted::new("first", 5, decline);
        let second = Scripted::new("second", 1, accept);
        let d = dispatcher(&[first.clone(), second.clone()]);
        d.init(&listener("r", &["first", "second"])).unwrap();

        let outcome = d.authenticate(2, "/", "/", &HeaderMap::new()).await;
        assert_eq!(outcome.identity().unwrap().method(), "second");
        assert_eq!((first.calls(), second.calls()), (1, 1));
    }

    #[tokio::test]
    async fn test_reject_short_circuits() {
        let first = Scripted::new("first", 5, reject);
        let second = Scripted::new("second", 1, accept);
        let d = dispatcher(&[first, second.clone()]);
        d.init(&listener("corp", &["first", "second"])).unwrap();

        let outcome = d.authenticate(3, "/", "/", &HeaderMap::new()).await;
        assert_eq!(second.calls(), 0);
        assert_eq!(outcome.status(), StatusCode::UNAUTHORIZED);
        assert!(matches!(outcome, Outcome::Rejected { .. }));
        assert_eq!(outcome.challenge(), Some(r#"Basic realm="corp""#));
    }

    #[tokio::test]
    async fn test_disabled_handlers_skipped() {
        let off = Scripted::new("off", 100, reject);
        let on = Scripted::new("on", 0, decline);
        let d = dispatcher(&[off.clone(), on]);
        d.init(&listener("r", &["on"])).unwrap();

        let outcome = d.authenticate(4, "/", "/", &HeaderMap::new()).await;
        assert!(matches!(outcome, Outcome::Unauthenticated { .. }));
        assert_eq!(off.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_enabled_methods() {
        let d = dispatcher(&[Scripted::new("basic", 0, accept)]);
        d.init(&listener("r", &[])).unwrap();
        assert!(d.challenge().is_none());

        let response = d
            .authenticate(5, "/", "/", &HeaderMap::new())
            .await
            .into_response::<()>();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_challenge_merge() {
        let basic = Scripted::with_scheme("basic", "Basic", true);
        let other = Scripted::with_scheme("other", "basic", true);
        let bearer = Scripted::with_scheme("bearer", "Bearer", false);
        let d = dispatcher(&[basic, other, bearer]);
        d.init(&listener(r#"a "quoted" \ realm"#, &["basic", "other", "bearer"]))
            .unwrap();
        assert_eq!(
            d.challenge().as_deref(),
            Some(r#"Basic realm="a \"quoted\" \\ realm", Bearer"#)
        );
    }

    struct Broken;

    #[async_trait]
    impl AuthHandler for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn init(&self, _: &ListenerAuth) -> Result<(), AuthError> {
            Err(AuthError::ConfigMismatch {
                method: "broken".into(),
                found: "u8",
                expected: "BrokenOptions",
            })
        }
        fn enabled(&self) -> bool {
            false
        }
        fn score(&self) -> i32 {
            0
        }
        fn www_auth_header(&self) -> Challenge {
            Challenge {
                scheme: "Broken",
                with_realm: false,
            }
        }
        async fn check(&self, _: u64, _: &str, _: &str, _: &HeaderMap) -> Verdict {
            Verdict::Decline
        }
    }

    #[tokio::test]
    async fn test_init_error_clears_chain() {
        let d = Dispatcher::with_source(|| {
            vec![Scripted::new("ok", 0, accept) as Arc<dyn AuthHandler>, Arc::new(Broken)]
        });
        let err = d.init(&listener("r", &["ok"])).unwrap_err();
        assert!(err.is_fatal());
        assert!(d.enabled_methods().is_empty());

        let outcome = d.authenticate(6, "/", "/", &HeaderMap::new()).await;
        assert!(matches!(outcome, Outcome::Unauthenticated { challenge: None }));
    }

    #[tokio::test]
    async fn test_reinit_swaps_chain() {
        let a = Scripted::new("a", 0, accept);
        let d = dispatcher(&[a]);
        d.init(&listener("r", &["a"])).unwrap();
        assert_eq!(d.enabled_methods(), ["a"]);

        d.init(&listener("r", &[])).unwrap();
        assert!(d.enabled_methods().is_empty());
        let outcome = d.authenticate(7, "/", "/", &HeaderMap::new()).await;
        assert!(outcome.identity().is_none());
    }

    /// Handler whose `check` parks until the test releases it.
    struct Gated {
        enabled: AtomicBool,
        entered: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl AuthHandler for Gated {
        fn name(&self) -> &'static str {
            "gated"
        }
        fn init(&self, listener: &ListenerAuth) -> Result<(), AuthError> {
            self.enabled
                .store(listener.enabled_method("gated").is_some(), Ordering::SeqCst);
            Ok(())
        }
        fn enabled(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }
        fn score(&self) -> i32 {
            0
        }
        fn www_auth_header(&self) -> Challenge {
            Challenge {
                scheme: "Basic",
                with_realm: true,
            }
        }
        async fn check(&self, _: u64, _: &str, _: &str, _: &HeaderMap) -> Verdict {
            self.entered.notify_one();
            self.release.notified().await;
            if self.enabled() {
                accept("gated")
            } else {
                Verdict::Decline
            }
        }
    }

    #[tokio::test]
    async fn test_in_flight_request_keeps_old_chain() {
        let entered = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());
        let d = {
            let entered = Arc::clone(&entered);
            let release = Arc::clone(&release);
            Arc::new(Dispatcher::with_source(move || {
                vec![Arc::new(Gated {
                    enabled: AtomicBool::new(false),
                    entered: Arc::clone(&entered),
                    release: Arc::clone(&release),
                }) as Arc<dyn AuthHandler>]
            }))
        };
        d.init(&listener("r", &["gated"])).unwrap();

        let request = {
            let d = Arc::clone(&d);
            tokio::spawn(async move { d.authenticate(8, "/", "/", &HeaderMap::new()).await })
        };
        entered.notified().await;

        d.init(&listener("r", &[])).unwrap();
        assert!(d.enabled_methods().is_empty());
        release.notify_one();

        let outcome = request.await.unwrap();
        assert_eq!(outcome.identity().map(|i| i.method()), Some("gated"));

        let after = d.authenticate(9, "/", "/", &HeaderMap::new()).await;
        assert!(matches!(after, Outcome::Unauthenticated { challenge: None }));
    }

    #[test]
    fn test_outcome_accessors() {
        let identity = Identity::new("basic", "alice", Default::default(), Default::default());
        let ok = Outcome::Authenticated(identity);
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.identity().map(|i| i.user()), Some("alice"));
        assert_eq!(ok.challenge(), None);

        let closed = Outcome::Unauthenticated { challenge: None };
        assert_eq!(closed.status(), StatusCode::UNAUTHORIZED);
        assert!(closed.identity().is_none());
        assert_eq!(closed.challenge(), None);

        let rejected = Outcome::Rejected {
            error: AuthError::Invalid { user: "bob".into() },
            challenge: Some("Bearer".into()),
        };
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(rejected.challenge(), Some("Bearer"));
    }

    #[test]
    fn test_response_shape() {
        let identity = Identity::new("basic", "alice", Default::default(), Default::default());
        let ok = Outcome::Authenticated(identity).into_response::<String>();
        assert_eq!(ok.status(), StatusCode::OK);
        assert!(ok.headers().is_empty());

        let denied = Outcome::Rejected {
            error: AuthError::Invalid { user: "bob".into() },
            challenge: Some(r#"Basic realm="r""#.into()),
        }
        .into_response::<String>();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(denied.headers()[WWW_AUTHENTICATE], r#"Basic realm="r""#);
        assert!(denied.body().is_empty());
    }
}
