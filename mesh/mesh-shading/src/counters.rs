//! Per-bucket atomic counters.
//!
//! One independently atomic cell per bucket. The same array is used twice
//! when building adjacency: first to count references per bucket, then,
//! after a reset, to hand out unique slots within each bucket's span.

use std::sync::atomic::{AtomicU32, Ordering};

/// A fixed-size array of atomic `u32` counters.
///
/// Increments are lock-free and safe under any number of concurrent
/// writers. Relaxed ordering is enough: readers only look at the counts
/// after the fork-join stage that wrote them has completed.
#[derive(Debug)]
pub struct AtomicCounters {
    cells: Vec<AtomicU32>,
}

impl AtomicCounters {
    /// Create `len` counters, all zero.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Number of counters.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether there are no counters.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Increment a counter, returning its previous value.
    ///
    /// # Panics
    ///
    /// Panics if `bucket` is out of range.
    #[inline]
    pub fn increment(&self, bucket: usize) -> u32 {
        self.cells[bucket].fetch_add(1, Ordering::Relaxed)
    }

    /// Current value of a counter.
    ///
    /// # Panics
    ///
    /// Panics if `bucket` is out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, bucket: usize) -> u32 {
        self.cells[bucket].load(Ordering::Relaxed)
    }

    /// Copy out all counter values.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u32> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// Set every counter back to zero.
    ///
    /// Takes `&mut self`, so no increment can be in flight.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell.get_mut() = 0;
        }
    }
}
