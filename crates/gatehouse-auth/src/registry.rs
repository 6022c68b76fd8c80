//! Explicit authentication method registry.
//!
//! Methods are registered once at startup with a typed options decoder and
//! a handler factory. The registry then turns raw listener configuration
//! into a validated [`ListenerAuth`] and hands out fresh handler instances.

use std::collections::HashMap;
use std::sync::Arc;

use gatehouse_config::ListenerConfig;
use serde_json::Value;

use crate::basic::{self, BasicHandler, BasicOptions};
use crate::error::AuthError;
use crate::options::{AuthOptions, ListenerAuth, MethodOptions, MethodSettings};
use crate::traits::{AuthHandler, UserVerifier};

type Decoder = fn(Option<&Value>) -> Result<MethodOptions, String>;
pub(crate) type Factory = Arc<dyn Fn() -> Arc<dyn AuthHandler> + Send + Sync>;

struct Registration {
    name: &'static str,
    decode: Decoder,
    factory: Factory,
}

/// Known authentication methods, in registration order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Basic method, verifying shared-store logins via `verifier`.
    pub fn with_basic(verifier: Arc<dyn UserVerifier>) -> Self {
        let mut registry = Self::new();
        registry.entries.push(Registration {
            name: basic::METHOD,
            decode: decode::<BasicOptions>,
            factory: Arc::new(move || Arc::new(BasicHandler::new(Arc::clone(&verifier)))),
        });
        registry
    }

    /// Register a method whose options decode into `O`.
    pub fn register<O, F>(&mut self, name: &'static str, factory: F) -> Result<(), AuthError>
    where
        O: AuthOptions,
        F: Fn() -> Arc<dyn AuthHandler> + Send + Sync + 'static,
    {
        if self.contains(name) {
            return Err(AuthError::Config(format!(
                "method \"{name}\" is already registered"
            )));
        }
        self.entries.push(Registration {
            name,
            decode: decode::<O>,
            factory: Arc::new(factory),
        });
        Ok(())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Registered method names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    /// One fresh handler per registered method, in registration order.
    pub fn handlers(&self) -> Vec<Arc<dyn AuthHandler>> {
        self.entries.iter().map(|e| (e.factory)()).collect()
    }

    /// The handler factories, in registration order.
    pub(crate) fn factories(&self) -> Vec<Factory> {
        self.entries.iter().map(|e| Arc::clone(&e.factory)).collect()
    }

    /// Decode and validate a listener's auth configuration.
    ///
    /// Every configured method must be registered. Options are decoded even
    /// for disabled methods so that a bad config fails at load time.
    pub fn prepare(&self, listener: &ListenerConfig) -> Result<ListenerAuth, AuthError> {
        let mut methods = HashMap::with_capacity(listener.auth.methods.len());
        for (name, config) in &listener.auth.methods {
            let entry = self
                .entries
                .iter()
                .find(|e| e.name == name.as_str())
                .ok_or_else(|| {
                    AuthError::Config(format!(
                        "listener \"{}\": unknown auth method \"{name}\"",
                        listener.name
                    ))
                })?;
            let options = (entry.decode)(config.options.as_ref()).map_err(|e| {
                AuthError::Config(format!(
                    "listener \"{}\": options for method \"{name}\": {e}",
                    listener.name
                ))
            })?;
            methods.insert(
                name.clone(),
                MethodSettings {
                    enabled: config.enabled,
                    score: config.score,
                    options: Some(options),
                },
            );
        }

        Ok(ListenerAuth {
            name: listener.name.clone(),
            realm: listener.realm.clone(),
            methods,
            users: Arc::new(listener.auth.users.clone()),
        })
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn decode<O: AuthOptions>(raw: Option<&Value>) -> Result<MethodOptions, String> {
    let options = match raw {
        None | Some(Value::Null) => O::default(),
        Some(value) => serde_json::from_value::<O>(value.clone()).map_err(|e| e.to_string())?,
    };
    options.check()?;
    Ok(MethodOptions::new(options))
}
