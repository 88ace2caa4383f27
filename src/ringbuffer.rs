//! Ringbuffer module for per-tick usage history.
//!
//! This module provides a fixed-size ringbuffer of byte counts with a running
//! sum, allocated once and overwritten in place.

/// A circular buffer of per-tick byte counts with fixed capacity.
///
/// Slots start zeroed, so a partially filled window sums correctly without
/// tracking which slots have been written.
#[derive(Debug, Clone)]
pub struct UsageWindow {
    slots: Vec<u64>,
    write_index: usize,
    count: usize,
    sum: u64,
}

impl UsageWindow {
    /// Creates a zero-filled window with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity.max(1)],
            write_index: 0,
            count: 0,
            sum: 0,
        }
    }

    /// Overwrites the slot under the cursor and advances it.
    ///
    /// Returns the value that was evicted.
    pub fn push(&mut self, usage: u64) -> u64 {
        let evicted = std::mem::replace(&mut self.slots[self.write_index], usage);
        self.sum = self.sum.saturating_sub(evicted).saturating_add(usage);
        self.write_index = (self.write_index + 1) % self.slots.len();

        if self.count < self.slots.len() {
            self.count += 1;
        }
        evicted
    }

    /// Sum of all slots, maintained incrementally.
    pub fn total(&self) -> u64 {
        self.sum
    }

    /// Sum of all slots, computed by walking the buffer.
    pub fn recompute_total(&self) -> u64 {
        self.slots.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Returns the written slots in chronological order (oldest to newest).
    pub fn history(&self) -> Vec<u64> {
        if self.count < self.slots.len() {
            // Not yet full, entries are in order from 0 to count-1
            return self.slots[..self.count].to_vec();
        }

        let mut result = Vec::with_capacity(self.count);
        result.extend_from_slice(&self.slots[self.write_index..]);
        result.extend_from_slice(&self.slots[..self.write_index]);
        result
    }

    /// Raw slot value by index.
    pub fn slot(&self, index: usize) -> Option<u64> {
        self.slots.get(index).copied()
    }

    /// Index of the slot the next push overwrites.
    pub fn cursor(&self) -> usize {
        self.write_index
    }

    /// Number of slots written so far, capped at capacity.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
