//! Instrumented Sorting Algorithms
//!
//! Six textbook comparison sorts, each taking `&mut [T]` and returning the
//! [`Metrics`](crate::Metrics) it accumulated:
//!
//! | Algorithm | Comparisons counted | Movements counted |
//! |-----------|---------------------|-------------------|
//! | bubble    | every adjacent test | 3 per swap |
//! | insertion | every backward test, including the one that stops the scan | key copy, shifts, write-back |
//! | selection | every suffix test | 3 per swap, only when the minimum moved |
//! | shell     | per shift, plus the value test that stops a gapped scan | key copy, shifts, write-back |
//! | merge     | one per head-to-head step | one per append, one per copy back |
//! | heap      | each existing child test | 3 per swap |

mod bubble;
mod heap;
mod insertion;
mod merge;
mod selection;
mod shell;

pub use bubble::bubble_sort;
pub use heap::heap_sort;
pub use insertion::insertion_sort;
pub use merge::merge_sort;
pub use selection::selection_sort;
pub use shell::{initial_gap, shell_sort};

#[cfg(test)]
mod tests {
    use crate::{Metrics, SortMethod};
    use proptest::{collection::vec, prelude::*};

    #[test]
    fn test_empty_and_single_inputs() {
        for method in SortMethod::ALL {
            let mut empty: Vec<i64> = Vec::new();
            assert_eq!(method.sort(&mut empty), Metrics::default(), "{method}");

            let mut single = vec![42i64];
            let metrics = method.sort(&mut single);
            assert_eq!(single, vec![42]);
            assert_eq!(metrics.comparisons, 0, "{method}");
            // Merge sort still writes its single element back
            let expected_moves = if method == SortMethod::Merge { 1 } else { 0 };
            assert_eq!(metrics.movements, expected_moves, "{method}");
        }
    }

    #[test]
    fn test_all_equal_elements() {
        for method in SortMethod::ALL {
            let mut data = vec![7u8; 33];
            method.sort(&mut data);
            assert!(data.iter().all(|&x| x == 7), "{method}");
        }
    }

    #[test]
    fn test_resorting_is_idempotent() {
        for method in SortMethod::ALL {
            let mut data: Vec<i64> = vec![9, -3, 4, 4, 0, 12, -8, 1];
            method.sort(&mut data);
            let once = data.clone();
            let first = method.sort(&mut data);
            let second = method.sort(&mut data);
            assert_eq!(data, once, "{method}");
            assert_eq!(first, second, "{method}");
        }
    }

    fn random_vec() -> impl Strategy<Value = Vec<i64>> {
        vec(any::<i64>(), 0..200)
    }

    fn narrow_vec() -> impl Strategy<Value = Vec<i64>> {
        // Small value range forces plenty of duplicates
        vec(-5i64..5, 0..120)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn sorts_produce_ordered_permutation(input in random_vec()) {
            let mut expected = input.clone();
            expected.sort();

            for method in SortMethod::ALL {
                let mut data = input.clone();
                method.sort(&mut data);
                prop_assert_eq!(&data, &expected, "{}", method);
            }
        }

        #[test]
        fn sorts_handle_duplicates(input in narrow_vec()) {
            let mut expected = input.clone();
            expected.sort();

            for method in SortMethod::ALL {
                let mut data = input.clone();
                method.sort(&mut data);
                prop_assert_eq!(&data, &expected, "{}", method);
            }
        }

        #[test]
        fn counts_are_deterministic(input in random_vec()) {
            for method in SortMethod::ALL {
                let mut a = input.clone();
                let mut b = input.clone();
                prop_assert_eq!(method.sort(&mut a), method.sort(&mut b), "{}", method);
            }
        }

        #[test]
        fn quadratic_sorts_have_fixed_comparison_counts(input in random_vec()) {
            let n = input.len() as u64;
            let pairs = n * n.saturating_sub(1) / 2;

            let mut data = input.clone();
            prop_assert_eq!(SortMethod::Bubble.sort(&mut data).comparisons, pairs);
            let mut data = input;
            prop_assert_eq!(SortMethod::Selection.sort(&mut data).comparisons, pairs);
        }
    }
}
