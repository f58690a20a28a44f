//! Operation descriptors and bound calculations

use std::fmt;

use crate::error::ArithmeticError;
use crate::operations::OperationFn;

/// Number of operands an operation consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// One operand; the second is a placeholder
    Unary,
    /// Two operands
    Binary,
}

impl Arity {
    pub fn operand_count(self) -> usize {
        match self {
            Self::Unary => 1,
            Self::Binary => 2,
        }
    }
}

/// A named numeric function that can be bound to operands
///
/// This is what the registry stores: `bind` plays the role of the constructor
/// producing a fresh, unexecuted [`Calculation`].
#[derive(Clone, Copy)]
pub struct Operation {
    name: &'static str,
    arity: Arity,
    summary: &'static str,
    func: OperationFn,
}

impl Operation {
    pub const fn new(
        name: &'static str,
        arity: Arity,
        summary: &'static str,
        func: OperationFn,
    ) -> Self {
        Self {
            name,
            arity,
            summary,
            func,
        }
    }

    /// Shorthand for a two-operand operation
    pub const fn binary(name: &'static str, summary: &'static str, func: OperationFn) -> Self {
        Self::new(name, Arity::Binary, summary, func)
    }

    /// Shorthand for a one-operand operation
    pub const fn unary(name: &'static str, summary: &'static str, func: OperationFn) -> Self {
        Self::new(name, Arity::Unary, summary, func)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// Bind operands, producing an unexecuted calculation
    pub fn bind(&self, a: f64, b: f64) -> Calculation {
        Calculation {
            operation: *self,
            a,
            b,
            result: None,
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// One invocation of an operation: two operands and, once executed, a result
#[derive(Debug, Clone)]
pub struct Calculation {
    operation: Operation,
    a: f64,
    b: f64,
    result: Option<f64>,
}

impl Calculation {
    /// Name of the operation that produced this calculation
    pub fn name(&self) -> &'static str {
        self.operation.name
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn arity(&self) -> Arity {
        self.operation.arity
    }

    pub fn operand_a(&self) -> f64 {
        self.a
    }

    pub fn operand_b(&self) -> f64 {
        self.b
    }

    /// `None` until `execute` has succeeded
    pub fn result(&self) -> Option<f64> {
        self.result
    }

    pub fn is_executed(&self) -> bool {
        self.result.is_some()
    }

    /// Run the numeric function and store the result
    ///
    /// The result is written at most once. On an already executed calculation
    /// the stored value is returned unchanged; on failure nothing is stored.
    pub fn execute(&mut self) -> Result<f64, ArithmeticError> {
        if let Some(result) = self.result {
            return Ok(result);
        }
        let result = (self.operation.func)(self.a, self.b)?;
        self.result = Some(result);
        Ok(result)
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arity() {
            Arity::Unary => write!(f, "{}({})", self.name(), self.a),
            Arity::Binary => write!(f, "{}({}, {})", self.name(), self.a, self.b),
        }
    }
}
