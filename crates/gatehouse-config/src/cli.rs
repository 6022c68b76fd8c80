//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Override log format (json/pretty/compact)
    #[arg(long)]
    pub log_format: Option<String>,
    /// Override the realm of every listener
    #[arg(long)]
    pub realm: Option<String>,
    /// Override the remote verification service URL
    #[arg(long, env = "GATEHOUSE_STORE_URL")]
    pub store_url: Option<String>,
    /// Override the remote verification timeout (seconds)
    #[arg(long)]
    pub store_timeout_secs: Option<u64>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
    if let Some(v) = &overrides.log_format {
        config.logging.format = Some(v.clone());
    }
    if let Some(v) = &overrides.realm {
        for listener in &mut config.listeners {
            listener.realm = v.clone();
        }
    }
    if let Some(v) = &overrides.store_url {
        config.store.http_url = Some(v.clone());
    }
    if let Some(v) = overrides.store_timeout_secs {
        config.store.timeout_secs = v;
    }
}
