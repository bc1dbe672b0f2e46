//! Sort Method Registry
//!
//! Maps instruction tags (`Insert`, `Shell`, ...) to algorithms, display names
//! and the analytic cost estimates reported next to measured counts.

use crate::Metrics;
use crate::sorts::{
    bubble_sort, heap_sort, insertion_sort, merge_sort, selection_sort, shell_sort,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tag did not name a known sort method
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sort method: {0:?} (expected one of Bubble, Insert, Select, Shell, Merge, Heap)")]
pub struct UnknownMethod(pub String);

/// One of the six instrumented sorts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortMethod {
    /// Bubble sort
    Bubble,
    /// Insertion sort
    Insertion,
    /// Selection sort
    Selection,
    /// Shell sort (Knuth gaps)
    Shell,
    /// Top-down merge sort
    Merge,
    /// Heap sort
    Heap,
}

/// Analytic estimate of the cost of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Expected comparisons
    pub comparisons: f64,
    /// Expected movements
    pub movements: f64,
}

impl SortMethod {
    /// Every method, in table order
    pub const ALL: [SortMethod; 6] = [
        SortMethod::Bubble,
        SortMethod::Insertion,
        SortMethod::Selection,
        SortMethod::Shell,
        SortMethod::Merge,
        SortMethod::Heap,
    ];

    /// Tag used in instruction files
    pub fn tag(self) -> &'static str {
        match self {
            SortMethod::Bubble => "Bubble",
            SortMethod::Insertion => "Insert",
            SortMethod::Selection => "Select",
            SortMethod::Shell => "Shell",
            SortMethod::Merge => "Merge",
            SortMethod::Heap => "Heap",
        }
    }

    /// Name shown in reports
    pub fn name(self) -> &'static str {
        match self {
            SortMethod::Bubble => "Bubble Sort",
            SortMethod::Insertion => "Insertion Sort",
            SortMethod::Selection => "Selection Sort",
            SortMethod::Shell => "Shell Sort",
            SortMethod::Merge => "Merge Sort",
            SortMethod::Heap => "Heap Sort",
        }
    }

    /// Run this method over `data`
    pub fn sort<T: Ord + Clone>(self, data: &mut [T]) -> Metrics {
        match self {
            SortMethod::Bubble => bubble_sort(data),
            SortMethod::Insertion => insertion_sort(data),
            SortMethod::Selection => selection_sort(data),
            SortMethod::Shell => shell_sort(data),
            SortMethod::Merge => merge_sort(data),
            SortMethod::Heap => heap_sort(data),
        }
    }

    /// Textbook approximation of the counts for an input of length `n`.
    ///
    /// These are the reference curves the measured counts are compared
    /// against, not exact predictions: insertion is the average case, heap and
    /// merge use `log2 n` rounded to an integer.
    pub fn expected(self, n: usize) -> Estimate {
        let nf = n as f64;
        let pairs = nf * (nf - 1.0) / 2.0;

        let (comparisons, movements) = match self {
            SortMethod::Bubble => (pairs, 1.5 * pairs),
            SortMethod::Insertion => (pairs / 2.0, nf * nf / 4.0 + 11.0 * nf / 4.0 - 3.0),
            SortMethod::Selection => (pairs, 3.0 * (nf - 1.0)),
            SortMethod::Shell => (nf * nf.powf(0.25), nf * nf.sqrt()),
            SortMethod::Merge => {
                if n > 1 {
                    let cost = nf * nf.log2().ceil();
                    (cost, cost)
                } else {
                    (0.0, 0.0)
                }
            }
            SortMethod::Heap => {
                if n > 1 {
                    let depth = n.ilog2() as f64;
                    (2.0 * nf * depth, 3.0 * nf * depth)
                } else {
                    (0.0, 0.0)
                }
            }
        };

        Estimate {
            comparisons,
            movements,
        }
    }
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        SortMethod::ALL
            .into_iter()
            .find(|method| method.tag() == tag)
            .ok_or_else(|| UnknownMethod(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("Insert".parse(), Ok(SortMethod::Insertion));
        assert_eq!("Shell".parse(), Ok(SortMethod::Shell));
        assert_eq!("Select".parse(), Ok(SortMethod::Selection));
        assert_eq!("Merge".parse(), Ok(SortMethod::Merge));
        assert_eq!("Heap".parse(), Ok(SortMethod::Heap));
        assert_eq!("Bubble".parse(), Ok(SortMethod::Bubble));
        assert_eq!(" Heap ".parse(), Ok(SortMethod::Heap));
    }

    #[test]
    fn test_parse_rejects_unknown_tags() {
        assert_eq!(
            "Quick".parse::<SortMethod>(),
            Err(UnknownMethod("Quick".to_string()))
        );
        // Display names are not tags
        assert!("Insertion Sort".parse::<SortMethod>().is_err());
        assert!("insert".parse::<SortMethod>().is_err());
    }

    #[test]
    fn test_tags_round_trip() {
        for method in SortMethod::ALL {
            assert_eq!(method.tag().parse(), Ok(method));
        }
    }

    #[test]
    fn test_expected_estimates() {
        let bubble = SortMethod::Bubble.expected(10);
        assert_eq!(bubble.comparisons, 45.0);
        assert_eq!(bubble.movements, 67.5);

        let selection = SortMethod::Selection.expected(5);
        assert_eq!(selection.comparisons, 10.0);
        assert_eq!(selection.movements, 12.0);

        let merge = SortMethod::Merge.expected(8);
        assert_eq!(merge.comparisons, 24.0);

        let heap = SortMethod::Heap.expected(8);
        assert_eq!(heap.comparisons, 48.0);
        assert_eq!(heap.movements, 72.0);

        assert_eq!(SortMethod::Heap.expected(1).comparisons, 0.0);
        assert_eq!(SortMethod::Merge.expected(0).movements, 0.0);
    }
}
