//! Calculator session
//!
//! Ties the registry, the bounded history list and the undo/redo stacks
//! together. Every successful calculation is executed, appended to the history,
//! saved as an undo snapshot and then announced to the observers.

use std::path::PathBuf;
use std::rc::Rc;

use abacus_core::{round_to, CalcError, Registry, SessionHistory, SharedCalculation, SnapshotManager};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CalculatorConfig;
use crate::export::{self, HistoryRecord};
use crate::observers::{AutoSaveObserver, HistoryEvent, HistoryObserver, LoggingObserver};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("Input value {value} is outside the allowed range (±{max})")]
    InputOutOfRange { value: f64, max: f64 },
}

impl SessionError {
    pub fn is_empty_history(&self) -> bool {
        matches!(self, SessionError::Calc(e) if e.is_empty_history())
    }
}

pub struct Calculator {
    config: CalculatorConfig,
    registry: Registry,
    history: SessionHistory,
    snapshots: SnapshotManager,
    observers: Vec<Box<dyn HistoryObserver>>,
}

impl Calculator {
    /// Calculator with the builtin operations and no observers
    pub fn new(config: CalculatorConfig) -> Result<Self, CalcError> {
        let registry = Registry::with_builtins()?;
        let history = SessionHistory::new(config.max_history_size);
        Ok(Self {
            config,
            registry,
            history,
            snapshots: SnapshotManager::new(),
            observers: Vec::new(),
        })
    }

    /// Calculator with the audit log observer, plus auto-save when enabled
    pub fn with_default_observers(config: CalculatorConfig) -> Result<Self, CalcError> {
        let mut calc = Self::new(config)?;
        calc.add_observer(Box::new(LoggingObserver::new(calc.config.precision)));
        if calc.config.auto_save {
            calc.add_observer(Box::new(AutoSaveObserver::new(
                calc.config.history_file(),
                calc.config.precision,
            )));
        }
        Ok(calc)
    }

    pub fn add_observer(&mut self, observer: Box<dyn HistoryObserver>) {
        debug!("Observer registered: {}", observer.name());
        self.observers.push(observer);
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.snapshots.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.snapshots.can_redo()
    }

    /// Round a value to the configured precision for display
    ///
    /// Ties round away from zero, so `0.125` shows as `0.13` at precision 2.
    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.config.precision)
    }

    /// Reject non-finite operands and magnitudes above `max_input_value`
    pub fn validate_operand(&self, value: f64) -> Result<(), SessionError> {
        let max = self.config.max_input_value;
        if !value.is_finite() || value.abs() > max {
            return Err(SessionError::InputOutOfRange { value, max });
        }
        Ok(())
    }

    /// Run an operation and record it
    ///
    /// Unary operations ignore `b`. Nothing is recorded when validation or
    /// execution fails.
    pub fn calculate(&mut self, name: &str, a: f64, b: f64) -> Result<SharedCalculation, SessionError> {
        self.validate_operand(a)?;
        self.validate_operand(b)?;

        let mut calc = self.registry.create(name, a, b)?;
        self.registry.execute(&mut calc)?;
        let calc = Rc::new(calc);

        for evicted in self.history.push(Rc::clone(&calc)) {
            debug!("History full, dropped oldest entry: {}", evicted);
        }
        self.snapshots.save(Rc::clone(&calc));
        self.notify(&HistoryEvent::Recorded(&calc));
        Ok(calc)
    }

    /// Undo the most recent calculation and drop it from the history
    pub fn undo(&mut self) -> Result<SharedCalculation, SessionError> {
        let calc = self.snapshots.undo()?;
        if !self.history.remove(&calc) {
            debug!("Undone calculation already evicted from history: {}", calc);
        }
        self.notify(&HistoryEvent::Undone(&calc));
        Ok(calc)
    }

    /// Re-append the most recently undone calculation
    pub fn redo(&mut self) -> Result<SharedCalculation, SessionError> {
        let calc = self.snapshots.redo()?;
        for evicted in self.history.push(Rc::clone(&calc)) {
            debug!("History full, dropped oldest entry: {}", evicted);
        }
        self.notify(&HistoryEvent::Redone(&calc));
        Ok(calc)
    }

    /// Empty the history and both undo/redo stacks
    pub fn clear(&mut self) {
        self.history.clear();
        self.snapshots.clear();
        self.notify(&HistoryEvent::Cleared);
    }

    /// Write the history CSV regardless of `auto_save`
    pub fn save(&mut self) -> anyhow::Result<PathBuf> {
        let path = self.config.history_file();
        let precision = self.config.precision;
        export::write_history(&path, self.history.entries(), precision)?;
        Ok(path)
    }

    /// Read back the saved history CSV; the session itself is unchanged
    pub fn load(&self) -> anyhow::Result<Vec<HistoryRecord>> {
        export::read_history(&self.config.history_file())
    }

    fn notify(&mut self, event: &HistoryEvent<'_>) {
        let Self {
            history, observers, ..
        } = self;
        let entries = history.entries();
        for observer in observers.iter_mut() {
            if let Err(e) = observer.notify(event, entries) {
                warn!("Observer {} failed: {:#}", observer.name(), e);
            }
        }
    }
}
