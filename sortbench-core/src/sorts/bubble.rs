//! Bubble sort: full `n - i - 1` passes, no early exit.

use crate::metrics::{Counter, Metrics};

/// Sort `data` in place with bubble sort.
///
/// Every adjacent pair is compared on every pass, so the comparison count is
/// always `n(n-1)/2` regardless of input order.
pub fn bubble_sort<T: Ord>(data: &mut [T]) -> Metrics {
    let n = data.len();
    let mut counter = Counter::new();

    for i in 0..n {
        for j in 0..n - i - 1 {
            counter.compare();
            if data[j] > data[j + 1] {
                data.swap(j, j + 1);
                counter.swapped();
            }
        }
    }

    counter.finish()
}
