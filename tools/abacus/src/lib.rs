//! Abacus - interactive calculator
//!
//! The arithmetic core lives in `abacus-core`; this crate adds the session
//! (history, undo/redo, observers), CSV persistence, configuration and the REPL.

pub mod config;
pub mod export;
pub mod observers;
pub mod repl;
pub mod session;

pub use config::{CalculatorConfig, ConfigError};
pub use export::HistoryRecord;
pub use observers::{AutoSaveObserver, HistoryEvent, HistoryObserver, LoggingObserver};
pub use session::{Calculator, SessionError};
