//! Top-down merge sort that copies the merged result back into the caller's slice.

use crate::metrics::{Counter, Metrics};

/// Sort `data` with merge sort.
///
/// Every append into a merge buffer is one movement, and so is every copy
/// of the final result back into `data`. Splitting is not counted.
pub fn merge_sort<T: Ord + Clone>(data: &mut [T]) -> Metrics {
    let mut counter = Counter::new();
    let sorted = sort_recursive(data.to_vec(), &mut counter);

    for (slot, value) in data.iter_mut().zip(sorted) {
        *slot = value;
        counter.moved();
    }

    counter.finish()
}

fn sort_recursive<T: Ord>(mut items: Vec<T>, counter: &mut Counter) -> Vec<T> {
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = sort_recursive(items, counter);
    let right = sort_recursive(right, counter);
    merge(left, right, counter)
}

/// Merge two sorted runs. Ties take from `left`, which keeps the sort stable.
fn merge<T: Ord>(left: Vec<T>, right: Vec<T>, counter: &mut Counter) -> Vec<T> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => {
                counter.compare();
                l <= r
            }
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        let next = if take_left { left.next() } else { right.next() };
        if let Some(value) = next {
            merged.push(value);
            counter.moved();
        }
    }

    merged
}
