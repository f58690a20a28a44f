//! Shared bootstrap for Abacus binaries
//!
//! - logging setup (console + file)
//! - layered configuration loading (defaults, TOML file, environment)

pub mod config_loader;
pub mod error;
pub mod logging;

pub use config_loader::{load_dotenv, load_layered, ConfigSources};
pub use error::{Error, Result};
pub use logging::{LogConfig, LogGuard};
