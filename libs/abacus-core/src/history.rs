//! Bounded session history
//!
//! Ordered list of executed calculations shown to the user and handed to
//! exporters. Once `max_size` is exceeded the oldest entry is dropped.

use std::collections::VecDeque;
use std::rc::Rc;

use tracing::debug;

use crate::snapshot::SharedCalculation;

#[derive(Debug)]
pub struct SessionHistory {
    entries: VecDeque<SharedCalculation>,
    max_size: usize,
}

impl SessionHistory {
    /// A `max_size` of zero is treated as one
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Append, evicting from the front while over capacity
    ///
    /// Returns the evicted entries, oldest first.
    pub fn push(&mut self, entry: SharedCalculation) -> Vec<SharedCalculation> {
        self.entries.push_back(entry);
        let mut evicted = Vec::new();
        while self.entries.len() > self.max_size {
            if let Some(oldest) = self.entries.pop_front() {
                debug!(entry = %oldest, "history full, evicting oldest entry");
                evicted.push(oldest);
            }
        }
        evicted
    }

    /// Remove `entry` by identity, newest occurrence first
    ///
    /// Two calculations with equal operands are still distinct entries, so
    /// this never removes the wrong one.
    pub fn remove(&mut self, entry: &SharedCalculation) -> bool {
        match self.entries.iter().rposition(|e| Rc::ptr_eq(e, entry)) {
            Some(index) => {
                self.entries.remove(index);
                true
            },
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn last(&self) -> Option<&SharedCalculation> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedCalculation> {
        self.entries.iter()
    }

    /// Read-only, contiguous view in insertion order
    pub fn entries(&mut self) -> &[SharedCalculation] {
        self.entries.make_contiguous()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn calc(a: f64) -> SharedCalculation {
        let registry = Registry::with_builtins().unwrap();
        let mut calc = registry.create("add", a, a).unwrap();
        registry.execute(&mut calc).unwrap();
        Rc::new(calc)
    }

    #[test]
    fn test_evicts_oldest() {
        let mut history = SessionHistory::new(2);
        let (a, b, c) = (calc(1.0), calc(2.0), calc(3.0));
        assert!(history.push(Rc::clone(&a)).is_empty());
        assert!(history.push(Rc::clone(&b)).is_empty());

        let evicted = history.push(Rc::clone(&c));
        assert_eq!(evicted.len(), 1);
        assert!(Rc::ptr_eq(&evicted[0], &a));
        assert_eq!(history.len(), 2);

        let remaining: Vec<_> = history.iter().map(|e| e.operand_a()).collect();
        assert_eq!(remaining, vec![2.0, 3.0]);
    }

    #[test]
    fn test_zero_max_size_holds_one() {
        let mut history = SessionHistory::new(0);
        history.push(calc(1.0));
        history.push(calc(2.0));
        assert_eq!(history.max_size(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.last().unwrap().operand_a(), 2.0);
    }

    #[test]
    fn test_remove_by_identity() {
        let mut history = SessionHistory::new(10);
        // Equal by value, different entries
        let first = calc(1.0);
        let second = calc(1.0);
        history.push(Rc::clone(&first));
        history.push(Rc::clone(&second));

        assert!(history.remove(&first));
        assert_eq!(history.len(), 1);
        assert!(Rc::ptr_eq(history.last().unwrap(), &second));
        assert!(!history.remove(&first));
    }

    #[test]
    fn test_entries_view_and_clear() {
        let mut history = SessionHistory::new(3);
        for i in 0..5 {
            history.push(calc(f64::from(i)));
        }
        let view: Vec<f64> = history.entries().iter().map(|e| e.operand_a()).collect();
        assert_eq!(view, vec![2.0, 3.0, 4.0]);
        assert_eq!(history.len(), 3);

        history.clear();
        assert!(history.is_empty());
    }
}
