//! Error types for abacus-core

use std::fmt;
use thiserror::Error;

/// Failures raised by the numeric functions themselves
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

impl ArithmeticError {
    pub fn invalid_domain(msg: impl Into<String>) -> Self {
        Self::InvalidDomain(msg.into())
    }
}

/// Which history stack an operation tried to pop from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undo => write!(f, "undo"),
            Self::Redo => write!(f, "redo"),
        }
    }
}

/// Calculator core errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    #[error("Nothing to {0}")]
    EmptyHistory(HistoryAction),

    #[error("Operation already registered: {0}")]
    DuplicateRegistration(String),
}

impl CalcError {
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation(name.into())
    }

    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateRegistration(name.into())
    }

    /// True for errors the REPL reports as a no-op notice rather than a failure
    pub fn is_empty_history(&self) -> bool {
        matches!(self, Self::EmptyHistory(_))
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
