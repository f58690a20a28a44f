//! Calculator configuration
//!
//! Loaded from defaults, an optional `abacus.toml` and `CALCULATOR_*`
//! environment variables (see [`common::config_loader`]).

use std::path::{Path, PathBuf};

use common::ConfigSources;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable prefix for every setting
pub const ENV_PREFIX: &str = "CALCULATOR_";
/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "abacus.toml";
/// File name of the exported history inside `history_dir`
pub const HISTORY_FILE: &str = "history.csv";
/// Upper bound for `precision`; beyond this f64 has no digits left to show
pub const MAX_PRECISION: u32 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_history_size must be at least 1")]
    InvalidHistorySize,

    #[error("precision must be between 0 and 15, got {0}")]
    InvalidPrecision(u32),

    #[error("max_input_value must be a positive finite number, got {0}")]
    InvalidMaxInput(f64),

    #[error("invalid log_level: {0}")]
    InvalidLogLevel(String),

    #[error(transparent)]
    Load(#[from] common::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Directory for `calculator.log`
    pub log_dir: PathBuf,
    /// Directory for `history.csv`
    pub history_dir: PathBuf,
    /// Session history bound; the oldest entry is dropped beyond it
    pub max_history_size: usize,
    /// Rewrite the history CSV after every change
    pub auto_save: bool,
    /// Decimal places used when showing and exporting results
    pub precision: u32,
    /// Largest accepted operand magnitude
    pub max_input_value: f64,
    /// File log level
    pub log_level: String,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            history_dir: PathBuf::from("history"),
            max_history_size: 100,
            auto_save: true,
            precision: 2,
            max_input_value: 1_000_000.0,
            log_level: "info".to_string(),
        }
    }
}

impl CalculatorConfig {
    /// Load and validate
    ///
    /// `file` must exist when given; otherwise `abacus.toml` is used if present.
    pub fn load(file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let sources = ConfigSources::new(ENV_PREFIX)
            .with_file(file)
            .with_default_file(DEFAULT_CONFIG_FILE);
        let config: Self = common::load_layered(&Self::default(), &sources)?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_size == 0 {
            return Err(ConfigError::InvalidHistorySize);
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::InvalidPrecision(self.precision));
        }
        if !self.max_input_value.is_finite() || self.max_input_value <= 0.0 {
            return Err(ConfigError::InvalidMaxInput(self.max_input_value));
        }
        common::logging::parse_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        Ok(())
    }

    /// Path of the exported history CSV
    pub fn history_file(&self) -> PathBuf {
        self.history_dir.join(HISTORY_FILE)
    }

    pub fn with_history_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.history_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_log_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = CalculatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_file(), PathBuf::from("history").join("history.csv"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = CalculatorConfig {
            max_history_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHistorySize)));

        let config = CalculatorConfig {
            precision: 40,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPrecision(40))));

        let config = CalculatorConfig {
            max_input_value: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxInput(_))));

        let config = CalculatorConfig {
            log_level: "chatty".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calc.toml");
        std::fs::write(
            &path,
            "precision = 4\nauto_save = false\nhistory_dir = \"saved\"\n",
        )
        .unwrap();

        let config = CalculatorConfig::load(Some(path)).unwrap();
        assert_eq!(config.precision, 4);
        assert!(!config.auto_save);
        assert_eq!(config.history_dir, PathBuf::from("saved"));
        assert_eq!(config.max_history_size, 100);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calc.toml");
        std::fs::write(&path, "max_history_size = 0\n").unwrap();
        assert!(matches!(
            CalculatorConfig::load(Some(path)),
            Err(ConfigError::InvalidHistorySize)
        ));
    }
}
