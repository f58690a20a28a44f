//! Undo/redo history built on snapshots
//!
//! A [`Snapshot`] wraps one completed calculation. The manager keeps two LIFO
//! stacks and moves snapshots between them; it never touches the calculation
//! itself. Mirroring the move into the visible session history is the caller's
//! job.

use std::rc::Rc;

use tracing::debug;

use crate::calculation::Calculation;
use crate::error::{CalcError, HistoryAction, Result};

/// Calculation shared between the session history and the snapshot stacks
pub type SharedCalculation = Rc<Calculation>;

/// Immutable record of one completed calculation
#[derive(Debug, Clone)]
pub struct Snapshot {
    state: SharedCalculation,
}

impl Snapshot {
    pub fn new(state: SharedCalculation) -> Self {
        Self { state }
    }

    /// The wrapped calculation (shared, not copied)
    pub fn state(&self) -> &SharedCalculation {
        &self.state
    }

    pub fn into_state(self) -> SharedCalculation {
        self.state
    }
}

/// Undo and redo stacks
#[derive(Debug, Default)]
pub struct SnapshotManager {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl SnapshotManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a snapshot of `state` and drop all redo history
    pub fn save(&mut self, state: SharedCalculation) {
        if !self.redo_stack.is_empty() {
            debug!(
                discarded = self.redo_stack.len(),
                "new snapshot invalidates redo history"
            );
        }
        self.undo_stack.push(Snapshot::new(state));
        self.redo_stack.clear();
    }

    /// Move the newest snapshot to the redo stack and return its calculation
    pub fn undo(&mut self) -> Result<SharedCalculation> {
        let snapshot = self
            .undo_stack
            .pop()
            .ok_or(CalcError::EmptyHistory(HistoryAction::Undo))?;
        let state = Rc::clone(snapshot.state());
        self.redo_stack.push(snapshot);
        Ok(state)
    }

    /// Move the newest undone snapshot back and return its calculation
    pub fn redo(&mut self) -> Result<SharedCalculation> {
        let snapshot = self
            .redo_stack
            .pop()
            .ok_or(CalcError::EmptyHistory(HistoryAction::Redo))?;
        let state = Rc::clone(snapshot.state());
        self.undo_stack.push(snapshot);
        Ok(state)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget both stacks
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
