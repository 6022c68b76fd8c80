//! Configuration validation logic.

use std::collections::{HashMap, HashSet};

use gatehouse_core::defaults::{LOG_FORMATS, LOG_OUTPUTS};

use crate::defaults::password_hash_hex_len;
use crate::loader::ConfigError;
use crate::{Config, UserDef};

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.listeners.is_empty() {
        return Err(ConfigError::Validation("listeners is empty".into()));
    }
    let mut names = HashSet::new();
    for listener in &config.listeners {
        if listener.name.trim().is_empty() {
            return Err(ConfigError::Validation("listener name is empty".into()));
        }
        if !names.insert(listener.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate listener name '{}'",
                listener.name
            )));
        }
        if listener.realm.is_empty() {
            return Err(ConfigError::Validation(format!(
                "listeners.{}.realm is empty",
                listener.name
            )));
        }
        if listener.realm.chars().any(char::is_control) {
            return Err(ConfigError::Validation(format!(
                "listeners.{}.realm contains control characters",
                listener.name
            )));
        }
        for method in listener.auth.methods.keys() {
            if method.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "listeners.{}.auth.methods has an empty method name",
                    listener.name
                )));
            }
        }
        validate_users(
            &format!("listeners.{}.auth.users", listener.name),
            &listener.auth.users,
        )?;
    }

    validate_users("store.users", &config.store.users)?;
    if let Some(url) = &config.store.http_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        return Err(ConfigError::Validation(
            "store.http_url must start with http:// or https://".into(),
        ));
    }
    if config.store.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "store.timeout_secs must be > 0".into(),
        ));
    }

    if let Some(format) = config.logging.format.as_deref()
        && !LOG_FORMATS.contains(&format)
    {
        return Err(ConfigError::Validation(format!(
            "logging.format must be one of: {:?}",
            LOG_FORMATS
        )));
    }
    if let Some(output) = config.logging.output.as_deref()
        && !LOG_OUTPUTS.contains(&output)
    {
        return Err(ConfigError::Validation(format!(
            "logging.output must be one of: {:?}",
            LOG_OUTPUTS
        )));
    }
    Ok(())
}

fn validate_users(section: &str, users: &HashMap<String, UserDef>) -> Result<(), ConfigError> {
    for (name, user) in users {
        if name.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{section} has an empty username"
            )));
        }
        // RFC 7617: the user-id cannot contain a colon
        if name.contains(':') {
            return Err(ConfigError::Validation(format!(
                "{section}.{name}: username must not contain ':'"
            )));
        }
        let hash = &user.password;
        if hash.len() != password_hash_hex_len()
            || !hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Err(ConfigError::Validation(format!(
                "{section}.{name}.password must be a {}-char lowercase hex hash",
                password_hash_hex_len()
            )));
        }
    }
    Ok(())
}
