//! Bounded FIFO histories used for rolling averages and trend display.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of observations kept by every history in the simulation.
pub const HISTORY_CAPACITY: usize = 10;

/// Insertion-ordered sequence that keeps only the most recent `capacity`
/// observations. The oldest value is dropped on insert once full.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundedHistory {
    capacity: usize,
    values: VecDeque<f64>,
}

impl BoundedHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// A history holding one initial observation, so `last()` and
    /// `average()` are always defined.
    pub fn seeded(capacity: usize, initial: f64) -> Self {
        let mut h = Self::new(capacity);
        h.push(initial);
        h
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Most recent observation, or 0.0 if nothing has been recorded.
    pub fn last(&self) -> f64 {
        self.values.back().copied().unwrap_or(0.0)
    }

    /// Arithmetic mean, or 0.0 for an empty history.
    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &f64> {
        self.values.iter()
    }
}
