//! Insertion sort with a backward scan that stops at the first in-place slot.

use crate::metrics::{Counter, Metrics};

/// Sort `data` in place with insertion sort.
///
/// Each outer step copies the key out (1 movement), shifts larger elements
/// right (1 movement each) and writes the key back (1 movement). The scan
/// breaks on the first element not greater than the key; that final test is
/// still counted as a comparison.
pub fn insertion_sort<T: Ord + Clone>(data: &mut [T]) -> Metrics {
    let n = data.len();
    let mut counter = Counter::new();

    for i in 1..n {
        let key = data[i].clone();
        counter.moved();

        // `hole` is the slot the key will land in
        let mut hole = i;
        while hole > 0 {
            counter.compare();
            if key < data[hole - 1] {
                data[hole] = data[hole - 1].clone();
                counter.moved();
                hole -= 1;
            } else {
                break;
            }
        }

        data[hole] = key;
        counter.moved();
    }

    counter.finish()
}
