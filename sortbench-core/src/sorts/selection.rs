//! Selection sort with a guarded swap.

use crate::metrics::{Counter, Metrics};

/// Sort `data` in place with selection sort.
///
/// The minimum of the unsorted suffix is swapped into place only when it is
/// not already there, so an outer step costs either 0 or 3 movements.
pub fn selection_sort<T: Ord>(data: &mut [T]) -> Metrics {
    let n = data.len();
    let mut counter = Counter::new();

    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        for j in i + 1..n {
            counter.compare();
            if data[j] < data[min] {
                min = j;
            }
        }

        if min != i {
            data.swap(i, min);
            counter.swapped();
        }
    }

    counter.finish()
}
