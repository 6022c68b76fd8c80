//! Authentication state for a whole config: the shared user store plus one
//! dispatcher per listener, swappable as a unit on config reload.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gatehouse_config::{Config, StoreConfig, validate_config};
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::AuthError;
use crate::memory::MemoryVerifier;
use crate::registry::Registry;
use crate::reloadable::ReloadableVerifier;
use crate::traits::UserVerifier;

type Listeners = HashMap<String, Arc<Dispatcher>>;

/// Live authentication state built from a [`Config`].
///
/// Shared-store logins go through one [`ReloadableVerifier`]; every listener
/// gets its own [`Dispatcher`]. [`reload`](Self::reload) builds the complete
/// new state before publishing any of it, so a bad config leaves the running
/// one untouched.
pub struct AuthRuntime {
    registry: Registry,
    store: Arc<ReloadableVerifier>,
    listeners: ArcSwap<Listeners>,
}

impl AuthRuntime {
    /// Build with the stock registry (HTTP Basic).
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        Self::with_registry(config, Registry::with_basic)
    }

    /// Build with a custom registry. `registry` receives the shared store that
    /// store-backed methods should verify against.
    pub fn with_registry<F>(config: &Config, registry: F) -> Result<Self, AuthError>
    where
        F: FnOnce(Arc<dyn UserVerifier>) -> Registry,
    {
        check(config)?;
        let store = Arc::new(ReloadableVerifier::from_arc(build_store(&config.store)?));
        let registry = registry(Arc::clone(&store) as Arc<dyn UserVerifier>);
        let listeners = build_listeners(&registry, config)?;
        info!(listeners = listeners.len(), "authentication runtime ready");
        Ok(Self {
            registry,
            store,
            listeners: ArcSwap::from_pointee(listeners),
        })
    }

    /// Apply a new config: swap the user store and re-initialize every
    /// listener's chain.
    ///
    /// A listener removed from the config stops resolving. Requests already
    /// running keep the dispatcher they resolved.
    pub fn reload(&self, config: &Config) -> Result<(), AuthError> {
        let prepared = check(config).and_then(|()| {
            let store = build_store(&config.store)?;
            let listeners = build_listeners(&self.registry, config)?;
            Ok((store, listeners))
        });
        let (store, listeners) = match prepared {
            Ok(next) => next,
            Err(err) => {
                warn!(error = %err, "config reload failed, keeping current authentication");
                return Err(err);
            }
        };

        self.store.reload_arc(store);
        let count = listeners.len();
        self.listeners.store(Arc::new(listeners));
        info!(listeners = count, "authentication config reloaded");
        Ok(())
    }

    /// Dispatcher of the named listener.
    pub fn dispatcher(&self, listener: &str) -> Option<Arc<Dispatcher>> {
        self.listeners.load().get(listener).cloned()
    }

    /// Configured listener names, sorted.
    pub fn listeners(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.load().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// The shared store behind store-backed logins.
    pub fn store(&self) -> Arc<dyn UserVerifier> {
        Arc::clone(&self.store) as Arc<dyn UserVerifier>
    }
}

impl std::fmt::Debug for AuthRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRuntime")
            .field("registry", &self.registry)
            .field("listeners", &self.listeners())
            .finish_non_exhaustive()
    }
}

fn check(config: &Config) -> Result<(), AuthError> {
    validate_config(config).map_err(|e| AuthError::Config(e.to_string()))
}

/// The remote user service if `http_url` is set, otherwise `store.users`.
fn build_store(config: &StoreConfig) -> Result<Arc<dyn UserVerifier>, AuthError> {
    #[cfg(feature = "http")]
    {
        if let Some(remote) = crate::http::HttpVerifier::from_config(config)? {
            return Ok(Arc::new(remote));
        }
    }
    #[cfg(not(feature = "http"))]
    {
        if config.http_url.is_some() {
            return Err(AuthError::Config(
                "store.http_url needs the \"http\" feature".into(),
            ));
        }
    }
    Ok(Arc::new(MemoryVerifier::from_users(config.users.clone())))
}

fn build_listeners(registry: &Registry, config: &Config) -> Result<Listeners, AuthError> {
    let mut listeners = HashMap::with_capacity(config.listeners.len());
    for listener in &config.listeners {
        let dispatcher = Dispatcher::new(registry);
        dispatcher.init(&registry.prepare(listener)?)?;
        listeners.insert(listener.name.clone(), Arc::new(dispatcher));
    }
    Ok(listeners)
}
