//! Heap sort on a max-heap built bottom-up.

use crate::metrics::{Counter, Metrics};

/// Sort `data` in place with heap sort.
pub fn heap_sort<T: Ord>(data: &mut [T]) -> Metrics {
    let n = data.len();
    let mut counter = Counter::new();

    for root in (0..n / 2).rev() {
        sift_down(data, root, n, &mut counter);
    }

    for end in (1..n).rev() {
        data.swap(0, end);
        counter.swapped();
        sift_down(data, 0, end, &mut counter);
    }

    counter.finish()
}

/// Restore the max-heap property below `root` within `data[..len]`.
///
/// A child comparison is only counted when that child exists.
fn sift_down<T: Ord>(data: &mut [T], mut root: usize, len: usize, counter: &mut Counter) {
    loop {
        let mut largest = root;
        let left = 2 * root + 1;
        let right = left + 1;

        if left < len {
            counter.compare();
            if data[left] > data[largest] {
                largest = left;
            }
        }
        if right < len {
            counter.compare();
            if data[right] > data[largest] {
                largest = right;
            }
        }

        if largest == root {
            return;
        }

        data.swap(root, largest);
        counter.swapped();
        root = largest;
    }
}
