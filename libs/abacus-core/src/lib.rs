//! abacus-core - Operations, registry and undo/redo history for the Abacus calculator
//!
//! # Features
//!
//! - **Operation library**: pure numeric functions with explicit failure modes
//! - **Registry**: name → operation mapping; new operations need no dispatch changes
//! - **Snapshots**: undo/redo stacks where a new save invalidates redo history
//! - **Session history**: bounded list of executed calculations, oldest evicted first
//!
//! # Example
//!
//! ```rust
//! use abacus_core::{Registry, SessionHistory, SnapshotManager};
//! use std::rc::Rc;
//!
//! let registry = Registry::with_builtins().unwrap();
//! let mut history = SessionHistory::new(100);
//! let mut snapshots = SnapshotManager::new();
//!
//! let mut calc = registry.create("power", 2.0, 10.0).unwrap();
//! assert_eq!(registry.execute(&mut calc).unwrap(), 1024.0);
//!
//! let calc = Rc::new(calc);
//! history.push(Rc::clone(&calc));
//! snapshots.save(calc);
//!
//! let undone = snapshots.undo().unwrap();
//! assert!(history.remove(&undone));
//! assert!(snapshots.can_redo());
//! ```
//!
//! # Builtin operations
//!
//! | Name | Alias | Failure |
//! |------|-------|---------|
//! | `add`, `subtract`, `multiply` | | none |
//! | `divide` | | DivisionByZero when b = 0 |
//! | `power` | | none (IEEE `powf`) |
//! | `modulus` | `mod` | DivisionByZero when b = 0 |
//! | `percentage` | `percent` | none, b = 0 yields 0 |
//! | `absolute_difference` | `abs_diff` | none |
//! | `square_root` | `sqrt` | InvalidDomain when a < 0 |
//! | `integer_division` | `int_divide` | DivisionByZero when trunc(b) = 0 |

pub mod calculation;
pub mod error;
pub mod history;
pub mod operations;
pub mod registry;
pub mod snapshot;

// Re-exports for convenience
pub use calculation::{Arity, Calculation, Operation};
pub use error::{ArithmeticError, CalcError, HistoryAction, Result};
pub use history::SessionHistory;
pub use operations::{round_to, OperationFn};
pub use registry::{register_builtins, Registry, BUILTIN_ALIASES, BUILTIN_OPERATIONS};
pub use snapshot::{SharedCalculation, Snapshot, SnapshotManager};
