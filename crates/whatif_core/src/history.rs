//! Bounded undo/redo history
//!
//! History is linear: the live entry sits on top of a ring buffer of older
//! entries, and undo moves the top onto a redo stack. Any new push discards
//! the redo stack. Once the buffer holds `capacity` entries the oldest one is
//! dropped on each push; this bounds memory during slider drags without ever
//! touching the live state.

use std::collections::VecDeque;
use std::mem;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::parameters::ParameterSet;

/// Default number of retained history entries, live entry included
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub parameter_set: ParameterSet,
    pub timestamp: Timestamp,
}

/// Plain-data summary of the history for display and export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryInfo {
    /// Entries in the history stack, live entry included (always >= 1)
    pub depth: usize,
    pub redo_depth: usize,
    pub capacity: usize,
    /// Entry timestamps, oldest first
    pub timestamps: Vec<Timestamp>,
}

impl HistoryInfo {
    pub fn can_undo(&self) -> bool {
        self.depth > 1
    }

    pub fn can_redo(&self) -> bool {
        self.redo_depth > 0
    }
}

#[derive(Debug, Clone)]
pub struct HistoryStack {
    /// Older entries, oldest at the front
    past: VecDeque<HistoryEntry>,
    /// The live entry; always present, so the stack is never empty
    current: HistoryEntry,
    /// Entries popped by undo, next redo target at the back
    redo: Vec<HistoryEntry>,
    capacity: usize,
}

impl HistoryStack {
    /// Create a stack seeded with `initial`.
    ///
    /// `capacity` counts the live entry, so a capacity of 1 retains no undo.
    pub fn new(initial: HistoryEntry, capacity: usize) -> Result<Self, SchemaError> {
        if capacity == 0 {
            return Err(SchemaError::ZeroHistoryCapacity);
        }
        Ok(Self {
            past: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            current: initial,
            redo: Vec::new(),
            capacity,
        })
    }

    /// Make `entry` the live entry and clear the redo stack.
    ///
    /// Returns the number of old entries trimmed to stay within capacity.
    pub fn push(&mut self, entry: HistoryEntry) -> usize {
        let previous = mem::replace(&mut self.current, entry);
        self.past.push_back(previous);
        self.redo.clear();
        self.trim()
    }

    /// Step back one entry. A no-op at the oldest retained entry.
    pub fn undo(&mut self) -> &ParameterSet {
        if let Some(previous) = self.past.pop_back() {
            let top = mem::replace(&mut self.current, previous);
            self.redo.push(top);
        }
        &self.current.parameter_set
    }

    /// Step forward one undone entry. A no-op when nothing was undone.
    pub fn redo(&mut self) -> &ParameterSet {
        if let Some(next) = self.redo.pop() {
            let top = mem::replace(&mut self.current, next);
            self.past.push_back(top);
            self.trim();
        }
        &self.current.parameter_set
    }

    pub fn current(&self) -> &ParameterSet {
        &self.current.parameter_set
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Entries in the stack, live entry included
    pub fn len(&self) -> usize {
        self.past.len() + 1
    }

    /// Always false; the stack holds at least the live entry
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest first, live entry last
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.past.iter().chain(std::iter::once(&self.current))
    }

    pub fn info(&self) -> HistoryInfo {
        HistoryInfo {
            depth: self.len(),
            redo_depth: self.redo_len(),
            capacity: self.capacity,
            timestamps: self.entries().map(|e| e.timestamp).collect(),
        }
    }

    fn trim(&mut self) -> usize {
        let mut dropped = 0;
        while self.past.len() + 1 > self.capacity {
            self.past.pop_front();
            dropped += 1;
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{ParameterSpec, Schema};

    fn base() -> ParameterSet {
        let schema = Schema::builder()
            .parameter(ParameterSpec::income("x").range(0.0, 1_000.0))
            .build()
            .unwrap();
        ParameterSet::new(Arc::new(schema))
    }

    fn entry(set: ParameterSet) -> HistoryEntry {
        HistoryEntry {
            parameter_set: set,
            timestamp: Timestamp::UNIX_EPOCH,
        }
    }

    fn stack_with(values: &[f64], capacity: usize) -> HistoryStack {
        let initial = base();
        let mut stack = HistoryStack::new(entry(initial.clone()), capacity).unwrap();
        for &v in values {
            stack.push(entry(initial.with_change("x", v).unwrap()));
        }
        stack
    }

    fn x(set: &ParameterSet) -> f64 {
        set.get("x").unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = HistoryStack::new(entry(base()), 0).unwrap_err();
        assert_eq!(err, SchemaError::ZeroHistoryCapacity);
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut stack = stack_with(&[1.0, 2.0, 3.0], 10);
        assert_eq!(stack.len(), 4);
        assert_eq!(x(stack.current()), 3.0);

        assert_eq!(x(stack.undo()), 2.0);
        assert_eq!(x(stack.undo()), 1.0);
        assert_eq!(stack.redo_len(), 2);

        assert_eq!(x(stack.redo()), 2.0);
        assert_eq!(x(stack.redo()), 3.0);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_at_oldest_is_noop() {
        let mut stack = stack_with(&[5.0], 10);
        assert_eq!(x(stack.undo()), 0.0);
        assert!(!stack.can_undo());
        assert_eq!(x(stack.undo()), 0.0);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.redo_len(), 1);
    }

    #[test]
    fn test_redo_with_empty_stack_is_noop() {
        let mut stack = stack_with(&[5.0], 10);
        assert_eq!(x(stack.redo()), 5.0);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack = stack_with(&[1.0, 2.0], 10);
        stack.undo();
        assert!(stack.can_redo());

        stack.push(entry(base().with_change("x", 9.0).unwrap()));
        assert!(!stack.can_redo());
        assert_eq!(x(stack.redo()), 9.0);
    }

    #[test]
    fn test_capacity_trims_oldest() {
        let values: Vec<f64> = (1..=8).map(f64::from).collect();
        let stack = stack_with(&values, 5);
        assert_eq!(stack.len(), 5);
        let retained: Vec<f64> = stack.entries().map(|e| x(&e.parameter_set)).collect();
        assert_eq!(retained, [4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_push_reports_trimmed_entries() {
        let mut stack = stack_with(&[1.0], 2);
        assert_eq!(stack.push(entry(base())), 1);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_capacity_one_keeps_only_live_entry() {
        let mut stack = stack_with(&[1.0, 2.0], 1);
        assert_eq!(stack.len(), 1);
        assert_eq!(x(stack.undo()), 2.0);
    }

    #[test]
    fn test_info_reports_depths() {
        let mut stack = stack_with(&[1.0, 2.0], 10);
        stack.undo();
        let info = stack.info();
        assert_eq!(info.depth, 2);
        assert_eq!(info.redo_depth, 1);
        assert_eq!(info.capacity, 10);
        assert_eq!(info.timestamps.len(), 2);
        assert!(info.can_undo());
        assert!(info.can_redo());
    }
}
