//! Single Job Execution
//!
//! The one place that turns a method tag and a materialized vector into
//! measured metrics. Every runner (in-process, thread, worker process) goes
//! through [`run_job`], so panics and unknown methods are handled the same
//! way regardless of isolation mode.

use crate::{Metrics, SortMethod, UnknownMethod};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Why a job produced no metrics
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The method tag did not resolve
    #[error(transparent)]
    UnknownMethod(#[from] UnknownMethod),

    /// The sort panicked
    #[error("Sort panicked: {0}")]
    Panicked(String),
}

/// Measured result of one sort invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortRun {
    /// Counts reported by the algorithm
    pub metrics: Metrics,
    /// Wall-clock time spent inside the sort
    pub elapsed: Duration,
}

/// Terminal state of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    /// Sort finished within its budget
    Completed {
        /// Wall-clock time of the sort
        elapsed: Duration,
        /// Counts reported by the algorithm
        metrics: Metrics,
    },
    /// Sort exceeded its budget and was abandoned or killed
    TimedOut,
    /// Sort could not run or crashed
    Failed {
        /// Diagnostic for the report
        message: String,
    },
}

impl JobOutcome {
    /// Elapsed time, absent on timeout or failure
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            JobOutcome::Completed { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }

    /// Metrics, absent on timeout or failure
    pub fn metrics(&self) -> Option<Metrics> {
        match self {
            JobOutcome::Completed { metrics, .. } => Some(*metrics),
            _ => None,
        }
    }

    /// Whether the job finished normally
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }
}

impl From<Result<SortRun, JobError>> for JobOutcome {
    fn from(result: Result<SortRun, JobError>) -> Self {
        match result {
            Ok(run) => JobOutcome::Completed {
                elapsed: run.elapsed,
                metrics: run.metrics,
            },
            Err(e) => JobOutcome::Failed {
                message: e.to_string(),
            },
        }
    }
}

/// Resolve `method_tag` and sort `data` with it, timing only the sort itself.
pub fn run_job(method_tag: &str, data: &mut [i64]) -> Result<SortRun, JobError> {
    let method: SortMethod = method_tag.parse()?;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let start = Instant::now();
        let metrics = method.sort(data);
        (metrics, start.elapsed())
    }));

    match result {
        Ok((metrics, elapsed)) => Ok(SortRun { metrics, elapsed }),
        Err(panic) => Err(JobError::Panicked(panic_message(panic.as_ref()))),
    }
}

/// Extract a printable message from a panic payload.
pub fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_job_sorts_and_counts() {
        let mut data = vec![3, 2, 1, 5, 4];
        let run = run_job("Select", &mut data).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4, 5]);
        assert_eq!(run.metrics, Metrics::new(10, 6));
    }

    #[test]
    fn test_run_job_unknown_method() {
        let mut data = vec![1, 2, 3];
        let err = run_job("Quick", &mut data).unwrap_err();
        assert_eq!(err, JobError::UnknownMethod(UnknownMethod("Quick".to_string())));
        // Untouched when the method never ran
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_outcome_accessors() {
        let done: JobOutcome = Ok(SortRun {
            metrics: Metrics::new(4, 5),
            elapsed: Duration::from_millis(3),
        })
        .into();
        assert!(done.is_completed());
        assert_eq!(done.metrics(), Some(Metrics::new(4, 5)));
        assert_eq!(done.elapsed(), Some(Duration::from_millis(3)));

        assert_eq!(JobOutcome::TimedOut.metrics(), None);
        assert_eq!(JobOutcome::TimedOut.elapsed(), None);

        let failed: JobOutcome = Err(JobError::Panicked("boom".to_string())).into();
        assert_eq!(
            failed,
            JobOutcome::Failed {
                message: "Sort panicked: boom".to_string()
            }
        );
    }

    #[test]
    fn test_panic_message_payloads() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn std::any::Any + Send> = Box::new(17u32);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }
}
