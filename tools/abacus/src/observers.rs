//! History change observers
//!
//! The calculator notifies every registered observer after the history list
//! changes. Observer failures are logged by the caller and never undo the change.

use std::path::PathBuf;

use abacus_core::{round_to, Calculation, SharedCalculation};
use anyhow::Result;
use tracing::{debug, info};

use crate::export;

/// What changed in the history
#[derive(Debug, Clone, Copy)]
pub enum HistoryEvent<'a> {
    /// A calculation was executed and appended
    Recorded(&'a Calculation),
    /// The most recent calculation was undone
    Undone(&'a Calculation),
    /// An undone calculation was appended again
    Redone(&'a Calculation),
    /// History and undo/redo stacks were emptied
    Cleared,
}

pub trait HistoryObserver {
    fn name(&self) -> &'static str;

    /// Called with the history as it is after the change
    fn notify(&mut self, event: &HistoryEvent<'_>, history: &[SharedCalculation]) -> Result<()>;
}

/// Rewrites the history CSV after every change
pub struct AutoSaveObserver {
    path: PathBuf,
    precision: u32,
}

impl AutoSaveObserver {
    pub fn new(path: impl Into<PathBuf>, precision: u32) -> Self {
        Self {
            path: path.into(),
            precision,
        }
    }
}

impl HistoryObserver for AutoSaveObserver {
    fn name(&self) -> &'static str {
        "auto_save"
    }

    fn notify(&mut self, _event: &HistoryEvent<'_>, history: &[SharedCalculation]) -> Result<()> {
        export::write_history(&self.path, history, self.precision)?;
        debug!("History auto-saved to {}", self.path.display());
        Ok(())
    }
}

/// Writes one audit line per recorded calculation
pub struct LoggingObserver {
    precision: u32,
}

impl LoggingObserver {
    pub fn new(precision: u32) -> Self {
        Self { precision }
    }

    fn format_result(&self, result: Option<f64>) -> String {
        match result {
            Some(value) => round_to(value, self.precision).to_string(),
            None => "pending".to_string(),
        }
    }
}

impl HistoryObserver for LoggingObserver {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn notify(&mut self, event: &HistoryEvent<'_>, _history: &[SharedCalculation]) -> Result<()> {
        match event {
            HistoryEvent::Recorded(calc) => info!(
                "Calculation performed: {} ({}, {}) = {}",
                calc.name(),
                calc.operand_a(),
                calc.operand_b(),
                self.format_result(calc.result())
            ),
            HistoryEvent::Undone(calc) => info!("Undone: {}", calc),
            HistoryEvent::Redone(calc) => info!("Redone: {}", calc),
            HistoryEvent::Cleared => info!("History cleared"),
        }
        Ok(())
    }
}
