//! Job Execution
//!
//! The sequential driver: for each instruction, materialize the input vector,
//! hand it to the runner and record the outcome. Nothing that happens to a
//! single job stops the run.
//!
//! ```text
//! JobDescriptor ──► generate_vector ──► JobRunner::run ──► JobResult
//!                        (StdRng)        (timeout-bounded)
//! ```

use super::runner::JobRunner;
use crate::instructions::JobDescriptor;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sortbench_core::{JobOutcome, SortMethod, VectorKind, generate_vector};
use std::time::Duration;

/// Outcome of one instruction
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    /// The instruction that produced this result
    pub descriptor: JobDescriptor,
    /// What happened
    pub outcome: JobOutcome,
}

impl JobResult {
    /// Sort time, `None` on timeout or failure
    pub fn elapsed(&self) -> Option<Duration> {
        self.outcome.elapsed()
    }

    /// Comparisons, `None` on timeout or failure
    pub fn comparisons(&self) -> Option<u64> {
        self.outcome.metrics().map(|m| m.comparisons)
    }

    /// Movements, `None` on timeout or failure
    pub fn movements(&self) -> Option<u64> {
        self.outcome.metrics().map(|m| m.movements)
    }
}

/// Drives a list of jobs through a runner, one at a time
pub struct Harness {
    runner: Box<dyn JobRunner>,
    rng: StdRng,
    show_progress: bool,
}

impl Harness {
    /// Random vectors come from `seed` when given, from entropy otherwise
    pub fn new(runner: Box<dyn JobRunner>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            runner,
            rng,
            show_progress: true,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Execute every job in order
    pub fn execute(&mut self, jobs: &[JobDescriptor]) -> Vec<JobResult> {
        let pb = if self.show_progress {
            ProgressBar::new(jobs.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            pb.set_message(job.key());
            let outcome = self.execute_single(job);
            pb.suspend(|| log_outcome(job, &outcome));
            results.push(JobResult {
                descriptor: job.clone(),
                outcome,
            });
            pb.inc(1);
        }

        pb.finish_with_message("Complete");
        results
    }

    fn execute_single(&mut self, job: &JobDescriptor) -> JobOutcome {
        let kind: VectorKind = match job.vector_type.parse() {
            Ok(kind) => kind,
            Err(e) => {
                return JobOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };

        let data = match generate_vector(job.size, kind, &mut self.rng) {
            Ok(data) => data,
            Err(e) => {
                return JobOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };

        if let Ok(method) = job.method.parse::<SortMethod>() {
            let expected = method.expected(job.size);
            tracing::debug!(
                line = job.line,
                expected_comparisons = expected.comparisons,
                expected_movements = expected.movements,
                "running {} on {} {} elements",
                method,
                job.size,
                kind
            );
        }

        self.runner.run(&job.method, data)
    }
}

fn log_outcome(job: &JobDescriptor, outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Completed { elapsed, metrics } => tracing::debug!(
            line = job.line,
            comparisons = metrics.comparisons,
            movements = metrics.movements,
            "{} done in {:?}",
            job.key(),
            elapsed
        ),
        JobOutcome::TimedOut => tracing::warn!(line = job.line, "{} timed out", job.key()),
        JobOutcome::Failed { message } => {
            tracing::error!(line = job.line, "{} failed: {}", job.key(), message)
        }
    }
}
