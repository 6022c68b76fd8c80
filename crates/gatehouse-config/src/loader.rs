//! Config file loading.
//!
//! The format follows the file extension: `.json`/`.jsonc` (comments
//! allowed), `.yaml`/`.yml` or `.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::Config;

/// Errors from loading or validating a config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    /// The file extension is not one of the known formats; holds the extension.
    #[error("unsupported config format '.{0}' (expected json, jsonc, yaml, yml or toml)")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext.to_ascii_lowercase().as_str() {
            "json" | "jsonc" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(ext.to_owned())),
        }
    }

    fn parse<T: DeserializeOwned>(self, data: &str) -> Result<T, ConfigError> {
        let value = match self {
            Self::Json => {
                serde_json::from_reader(json_comments::StripComments::new(data.as_bytes()))?
            }
            Self::Yaml => serde_yaml::from_str(data)?,
            Self::Toml => toml::from_str(data)?,
        };
        Ok(value)
    }
}

/// Load a config file. Defaults are filled in; call
/// [`validate_config`](crate::validate_config) before using it.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    // Reject unknown formats before touching the file
    let format = Format::from_path(path)?;
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    format.parse(&data)
}
