//! Method options and the per-listener auth snapshot.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use gatehouse_config::UserDef;
use serde::de::DeserializeOwned;

/// Options type of an authentication method.
///
/// Decoded from the method's `options` table when the configuration is
/// loaded; `check` runs right after decoding.
pub trait AuthOptions: DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static {
    /// Validate decoded options.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Decoded options of some method, with their concrete type erased.
#[derive(Clone)]
pub struct MethodOptions {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl MethodOptions {
    pub fn new<O: Any + Send + Sync>(options: O) -> Self {
        Self {
            value: Arc::new(options),
            type_name: type_name::<O>(),
        }
    }

    /// Recover the concrete options, or `None` if they are of another type.
    pub fn downcast<O: Any + Send + Sync>(&self) -> Option<Arc<O>> {
        Arc::clone(&self.value).downcast::<O>().ok()
    }

    /// Concrete type name, for diagnostics.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for MethodOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodOptions")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Validated settings of one method on one listener.
#[derive(Debug, Clone)]
pub struct MethodSettings {
    pub enabled: bool,
    pub score: i32,
    pub options: Option<MethodOptions>,
}

/// Read-only auth configuration of one listener.
///
/// Built by [`Registry::prepare`](crate::Registry::prepare) and handed to
/// every handler's `init`.
#[derive(Debug, Clone)]
pub struct ListenerAuth {
    pub name: String,
    pub realm: String,
    pub methods: HashMap<String, MethodSettings>,
    /// Statically configured users, shared by all handlers of the listener.
    pub users: Arc<HashMap<String, UserDef>>,
}

impl ListenerAuth {
    /// Settings for `method` if it is configured and enabled.
    pub fn enabled_method(&self, method: &str) -> Option<&MethodSettings> {
        self.methods.get(method).filter(|m| m.enabled)
    }
}
