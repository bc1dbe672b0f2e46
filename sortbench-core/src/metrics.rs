//! Comparison and Movement Accounting
//!
//! Every sort threads a [`Counter`] through its loops and returns the frozen
//! [`Metrics`] once it is done. Nothing is global: two sorts running at the
//! same time never see each other's counts.

use serde::{Deserialize, Serialize};

/// Final counts produced by a single sort invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metrics {
    /// Element-to-element ordering tests (`<`, `>`, `<=`)
    pub comparisons: u64,
    /// Scalar writes into the sequence's storage (a swap is three)
    pub movements: u64,
}

impl Metrics {
    /// Create metrics from raw counts
    pub fn new(comparisons: u64, movements: u64) -> Self {
        Self {
            comparisons,
            movements,
        }
    }
}

/// Mutable accumulator passed by reference into the sort loops.
#[derive(Debug, Default)]
pub struct Counter {
    comparisons: u64,
    movements: u64,
}

impl Counter {
    /// Fresh counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one ordering test
    #[inline]
    pub fn compare(&mut self) {
        self.comparisons += 1;
    }

    /// Record one slot write
    #[inline]
    pub fn moved(&mut self) {
        self.movements += 1;
    }

    /// Record a swap of two slots (read-read-write modelled as three writes)
    #[inline]
    pub fn swapped(&mut self) {
        self.movements += 3;
    }

    /// Comparisons counted so far
    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    /// Movements counted so far
    pub fn movements(&self) -> u64 {
        self.movements
    }

    /// Freeze the counts
    pub fn finish(self) -> Metrics {
        Metrics {
            comparisons: self.comparisons,
            movements: self.movements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_accumulates() {
        let mut counter = Counter::new();
        counter.compare();
        counter.compare();
        counter.moved();
        counter.swapped();

        assert_eq!(counter.comparisons(), 2);
        assert_eq!(counter.movements(), 4);
        assert_eq!(counter.finish(), Metrics::new(2, 4));
    }

    #[test]
    fn test_default_metrics_are_zero() {
        let metrics = Metrics::default();
        assert_eq!(metrics.comparisons, 0);
        assert_eq!(metrics.movements, 0);
    }
}
