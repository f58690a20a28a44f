//! Layered configuration loading
//!
//! Priority (highest to lowest):
//! 1. Environment variables with the given prefix
//! 2. TOML file (explicit path, or an optional default file)
//! 3. Default values

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Where a configuration may come from
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Explicit file; it is an error if this does not exist
    pub file: Option<PathBuf>,
    /// File picked up only when present (e.g. `abacus.toml` in the working directory)
    pub default_file: Option<PathBuf>,
    /// Environment variable prefix, e.g. `CALCULATOR_`
    pub env_prefix: String,
}

impl ConfigSources {
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            file: None,
            default_file: None,
            env_prefix: env_prefix.into(),
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    pub fn with_default_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.default_file = Some(file.into());
        self
    }
}

/// Load a `.env` file from the working directory (or a parent) into the process environment
///
/// A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenv::dotenv() {
        Ok(path) => {
            debug!("Loaded environment from {}", path.display());
            Some(path)
        },
        Err(_) => None,
    }
}

/// Merge defaults, file and environment into `T`
pub fn load_layered<T>(defaults: &T, sources: &ConfigSources) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut figment = Figment::from(Serialized::defaults(defaults));

    match (&sources.file, &sources.default_file) {
        (Some(path), _) => {
            if !path.exists() {
                return Err(Error::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            info!("Using config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        },
        (None, Some(path)) if path.exists() => {
            info!("Using config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        },
        _ => debug!("No config file, using defaults and environment"),
    }

    figment = figment.merge(Env::prefixed(&sources.env_prefix));

    Ok(figment.extract()?)
}
