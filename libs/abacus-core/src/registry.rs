//! Operation registry
//!
//! Maps operation names to [`Operation`] descriptors. Dispatch never matches on
//! concrete operations: adding one means registering a name and a function.
//!
//! Names are normalised (trimmed, lower-cased) on the way in and on lookup, so
//! `ADD`, ` add ` and `add` resolve to the same entry.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::calculation::{Calculation, Operation};
use crate::error::{CalcError, Result};
use crate::operations;

/// Operations installed by [`Registry::with_builtins`]
pub const BUILTIN_OPERATIONS: &[Operation] = &[
    Operation::binary("add", "Add two numbers", operations::add),
    Operation::binary(
        "subtract",
        "Subtract the second number from the first",
        operations::subtract,
    ),
    Operation::binary("multiply", "Multiply two numbers", operations::multiply),
    Operation::binary(
        "divide",
        "Divide the first number by the second",
        operations::divide,
    ),
    Operation::binary(
        "power",
        "Raise the first number to the power of the second",
        operations::power,
    ),
    Operation::binary(
        "modulus",
        "Remainder of a / b, signed like the divisor",
        operations::modulus,
    ),
    Operation::binary(
        "percentage",
        "Express a as a percentage of b",
        operations::percentage,
    ),
    Operation::binary(
        "absolute_difference",
        "Absolute difference between two numbers",
        operations::absolute_difference,
    ),
    Operation::unary("square_root", "Square root of a number", operations::square_root),
    Operation::binary(
        "integer_division",
        "Floor division of the truncated operands",
        operations::integer_division,
    ),
];

/// Short spellings accepted for builtin operations: (alias, target)
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("mod", "modulus"),
    ("percent", "percentage"),
    ("abs_diff", "absolute_difference"),
    ("sqrt", "square_root"),
    ("int_divide", "integer_division"),
];

fn normalise(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Name → operation mapping
#[derive(Debug, Default)]
pub struct Registry {
    /// Canonical entries, ordered for stable listings
    entries: BTreeMap<String, Operation>,
    /// alias → canonical name
    aliases: HashMap<String, String>,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the builtin table
    ///
    /// Fails only if the builtin table itself contains a duplicate, which is a
    /// startup error.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        register_builtins(&mut registry)?;
        Ok(registry)
    }

    /// Add an operation under its own name
    pub fn register(&mut self, operation: Operation) -> Result<()> {
        let key = normalise(operation.name());
        if key.is_empty() {
            return Err(CalcError::unknown_operation(operation.name()));
        }
        if self.is_taken(&key) {
            return Err(CalcError::duplicate(key));
        }
        debug!(name = %key, "registered operation");
        self.entries.insert(key, operation);
        Ok(())
    }

    /// Make `alias` resolve to the registered operation `target`
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<()> {
        let alias_key = normalise(alias);
        let target_key = normalise(target);
        if alias_key.is_empty() {
            return Err(CalcError::unknown_operation(alias));
        }
        if !self.entries.contains_key(&target_key) {
            return Err(CalcError::unknown_operation(target_key));
        }
        if self.is_taken(&alias_key) {
            return Err(CalcError::duplicate(alias_key));
        }
        debug!(alias = %alias_key, target = %target_key, "registered alias");
        self.aliases.insert(alias_key, target_key);
        Ok(())
    }

    /// Look up an operation by name or alias
    pub fn get(&self, name: &str) -> Option<&Operation> {
        let key = normalise(name);
        match self.aliases.get(&key) {
            Some(target) => self.entries.get(target),
            None => self.entries.get(&key),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Build a new, unexecuted calculation for `name`
    pub fn create(&self, name: &str, a: f64, b: f64) -> Result<Calculation> {
        self.get(name)
            .map(|operation| operation.bind(a, b))
            .ok_or_else(|| CalcError::unknown_operation(name.trim()))
    }

    /// Execute a calculation, storing and returning its result
    ///
    /// Arithmetic failures propagate unchanged and leave the result unset.
    pub fn execute(&self, calculation: &mut Calculation) -> Result<f64> {
        Ok(calculation.execute()?)
    }

    /// Registered operations in name order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.entries.values()
    }

    /// Aliases pointing at `name`, sorted
    pub fn aliases_of(&self, name: &str) -> Vec<&str> {
        let key = normalise(name);
        let mut aliases: Vec<&str> = self
            .aliases
            .iter()
            .filter(|(_, target)| **target == key)
            .map(|(alias, _)| alias.as_str())
            .collect();
        aliases.sort_unstable();
        aliases
    }

    /// Every name `create` accepts: canonical names followed by aliases
    pub fn names(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.aliases.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        self.entries
            .keys()
            .map(String::as_str)
            .chain(aliases)
            .collect()
    }

    /// Number of canonical operations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_taken(&self, key: &str) -> bool {
        self.entries.contains_key(key) || self.aliases.contains_key(key)
    }
}

/// Install the builtin operations and their aliases
pub fn register_builtins(registry: &mut Registry) -> Result<()> {
    for operation in BUILTIN_OPERATIONS {
        registry.register(*operation)?;
    }
    for (alias, target) in BUILTIN_ALIASES {
        registry.alias(alias, target)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::error::ArithmeticError;

    fn triple(a: f64, _b: f64) -> std::result::Result<f64, ArithmeticError> {
        Ok(a * 3.0)
    }

    #[test]
    fn test_builtins_registered() {
        let registry = Registry::with_builtins().unwrap();
        assert_eq!(registry.len(), BUILTIN_OPERATIONS.len());
        for operation in BUILTIN_OPERATIONS {
            assert!(registry.contains(operation.name()));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = Registry::with_builtins().unwrap();
        let calc = registry.create("ADD", 1.0, 2.0).unwrap();
        assert_eq!(calc.name(), "add");
        assert!(registry.create("  Multiply ", 1.0, 2.0).is_ok());
    }

    #[test]
    fn test_alias_resolves_to_target() {
        let registry = Registry::with_builtins().unwrap();
        let calc = registry.create("int_divide", 5.0, 2.0).unwrap();
        assert_eq!(calc.name(), "integer_division");
        assert_eq!(registry.aliases_of("square_root"), vec!["sqrt"]);
    }

    #[test]
    fn test_unknown_operation() {
        let registry = Registry::with_builtins().unwrap();
        let err = registry.create("__unregistered__", 1.0, 1.0).unwrap_err();
        assert_eq!(err, CalcError::UnknownOperation("__unregistered__".into()));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = Registry::with_builtins().unwrap();
        let err = registry
            .register(Operation::binary("Add", "again", triple))
            .unwrap_err();
        assert_eq!(err, CalcError::DuplicateRegistration("add".into()));

        // An alias cannot shadow a canonical name or another alias
        assert!(registry.alias("add", "multiply").is_err());
        assert!(registry.alias("sqrt", "add").is_err());
        // Nor point at something that does not exist
        assert!(matches!(
            registry.alias("x", "nope"),
            Err(CalcError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_register_custom_operation() {
        let mut registry = Registry::with_builtins().unwrap();
        registry
            .register(Operation::unary("triple", "Multiply by three", triple))
            .unwrap();
        let mut calc = registry.create("triple", 4.0, 0.0).unwrap();
        assert_eq!(registry.execute(&mut calc).unwrap(), 12.0);
    }

    #[test]
    fn test_execute_failure_propagates() {
        let registry = Registry::with_builtins().unwrap();
        let mut calc = registry.create("divide", 1.0, 0.0).unwrap();
        let err = registry.execute(&mut calc).unwrap_err();
        assert_eq!(err, CalcError::Arithmetic(ArithmeticError::DivisionByZero));
        assert_eq!(calc.result(), None);
    }

    #[test]
    fn test_names_lists_aliases_after_operations() {
        let registry = Registry::with_builtins().unwrap();
        let names = registry.names();
        assert_eq!(names.len(), BUILTIN_OPERATIONS.len() + BUILTIN_ALIASES.len());
        assert_eq!(names[0], "absolute_difference");
        assert!(names.contains(&"abs_diff"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = Registry::new();
        assert!(registry
            .register(Operation::binary("  ", "blank", triple))
            .is_err());
        assert!(registry.is_empty());
    }
}
