//! Shell sort over Knuth's `3h + 1` gap sequence.

use crate::metrics::{Counter, Metrics};

/// Largest Knuth gap used for a sequence of length `n`.
///
/// Grows `h = 3h + 1` from 1 while `h < n / 3`.
pub fn initial_gap(n: usize) -> usize {
    let mut h = 1;
    while h < n / 3 {
        h = 3 * h + 1;
    }
    h
}

/// Sort `data` in place with shell sort.
///
/// Each gapped insertion step counts one comparison per shift. When the inner
/// loop stops on a failed value test (rather than on the `j >= h` bound) one
/// extra comparison is recorded for that test.
pub fn shell_sort<T: Ord + Clone>(data: &mut [T]) -> Metrics {
    let n = data.len();
    let mut counter = Counter::new();
    let mut h = initial_gap(n);

    while h >= 1 {
        for i in h..n {
            let aux = data[i].clone();
            counter.moved();

            let mut j = i;
            while j >= h && data[j - h] > aux {
                counter.compare();
                data[j] = data[j - h].clone();
                counter.moved();
                j -= h;
            }
            if j >= h {
                counter.compare();
            }

            data[j] = aux;
            counter.moved();
        }
        h /= 3;
    }

    counter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorts::insertion_sort;

    #[test]
    fn test_gap_sequence() {
        assert_eq!(initial_gap(0), 1);
        assert_eq!(initial_gap(5), 1);
        assert_eq!(initial_gap(13), 4);
        assert_eq!(initial_gap(100), 13);
        assert_eq!(initial_gap(1000), 121);
    }

    #[test]
    fn test_reference_trace() {
        let mut data = vec![3, 2, 1, 5, 4];
        let metrics = shell_sort(&mut data);
        assert_eq!(data, vec![1, 2, 3, 4, 5]);
        assert_eq!(metrics, Metrics::new(6, 12));
    }

    #[test]
    fn test_single_gap_matches_insertion_sort() {
        // n < 6 only ever uses h = 1, which is plain insertion sort
        for input in [vec![5, 4, 3, 2, 1], vec![2, 1, 2, 1, 2], vec![1, 2, 3]] {
            let mut a = input.clone();
            let mut b = input;
            assert_eq!(shell_sort(&mut a), insertion_sort(&mut b));
            assert_eq!(a, b);
        }
    }
}
