//! Job Runners
//!
//! A [`JobRunner`] executes one `(method, vector)` pair under a hard timeout
//! and always comes back with a [`JobOutcome`]. Three isolation modes:
//!
//! - **Process** ([`ProcessRunner`]): the sort runs in a worker process that
//!   is terminated on timeout. Workers are reused between jobs unless
//!   `one_shot` is set, and replaced after any timeout or crash.
//! - **Thread** ([`ThreadRunner`]): the sort runs on a dedicated thread. On
//!   timeout the thread is detached and abandoned; it keeps its CPU until the
//!   sort finishes on its own.
//! - **In-process** ([`InProcessRunner`]): the sort runs on the calling
//!   thread with no timeout.

use crate::config::IsolationMode;
use crate::supervisor::{SupervisorError, WorkerHandle, WorkerOutcome};
use sortbench_core::{JobError, JobOutcome, Metrics, SortRun, run_job};
use sortbench_ipc::JobRequest;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

/// Executes one sort invocation at a time
pub trait JobRunner {
    /// Sort `data` with the method named by `method`, bounded by the runner's timeout
    fn run(&mut self, method: &str, data: Vec<i64>) -> JobOutcome;
}

/// Build the runner for `isolation`.
pub fn build_runner(isolation: IsolationMode, timeout: Duration, one_shot: bool) -> Box<dyn JobRunner> {
    match isolation {
        IsolationMode::Process => Box::new(ProcessRunner::new(timeout, one_shot)),
        IsolationMode::Thread => Box::new(ThreadRunner::new(timeout)),
        IsolationMode::InProcess => Box::new(InProcessRunner),
    }
}

/// Runs each job in a killable worker process
pub struct ProcessRunner {
    timeout: Duration,
    one_shot: bool,
    binary: Option<PathBuf>,
    worker: Option<WorkerHandle>,
    next_job_id: u64,
}

impl ProcessRunner {
    /// Workers are spawned from the current executable
    pub fn new(timeout: Duration, one_shot: bool) -> Self {
        Self {
            timeout,
            one_shot,
            binary: None,
            worker: None,
            next_job_id: 0,
        }
    }

    /// Spawn workers from `binary` instead of the current executable
    pub fn with_worker_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    fn spawn_worker(&self) -> Result<WorkerHandle, SupervisorError> {
        match &self.binary {
            Some(binary) => WorkerHandle::spawn_binary(binary, self.timeout),
            None => WorkerHandle::spawn(self.timeout),
        }
    }

    fn dispatch(&mut self, job: JobRequest) -> Result<WorkerOutcome, SupervisorError> {
        let mut worker = match self.worker.take().and_then(|mut w| w.is_alive().then_some(w)) {
            Some(worker) => worker,
            None => self.spawn_worker()?,
        };

        let result = worker.run_job(job);

        // Crashed or timed-out workers are dropped (and killed) here
        if result.is_ok() && !self.one_shot {
            self.worker = Some(worker);
        } else if result.is_ok() {
            let _ = worker.shutdown();
        }
        result
    }
}

impl JobRunner for ProcessRunner {
    fn run(&mut self, method: &str, data: Vec<i64>) -> JobOutcome {
        let job_id = self.next_job_id;
        self.next_job_id += 1;

        let job = JobRequest {
            job_id,
            method: method.to_string(),
            data,
        };

        match self.dispatch(job) {
            Ok(WorkerOutcome::Completed {
                comparisons,
                movements,
                elapsed,
            }) => JobOutcome::Completed {
                elapsed,
                metrics: Metrics::new(comparisons, movements),
            },
            Ok(WorkerOutcome::Failed { message, .. }) => JobOutcome::Failed { message },
            Err(SupervisorError::Timeout) => JobOutcome::TimedOut,
            Err(e) => JobOutcome::Failed {
                message: e.to_string(),
            },
        }
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown();
        }
    }
}

/// Runs each job on its own thread, abandoned on timeout
pub struct ThreadRunner {
    timeout: Duration,
}

impl ThreadRunner {
    /// Runner with the given per-job timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn run_with_deadline<F>(&self, name: String, job: F) -> JobOutcome
    where
        F: FnOnce() -> Result<SortRun, JobError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let spawned = std::thread::Builder::new().name(name).spawn(move || {
            // Receiver is gone if the job was abandoned
            let _ = tx.send(job());
        });
        if let Err(e) = spawned {
            return JobOutcome::Failed {
                message: format!("Failed to spawn sort thread: {}", e),
            };
        }

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result.into(),
            Err(RecvTimeoutError::Timeout) => {
                tracing::debug!("abandoning sort thread after {:?}", self.timeout);
                JobOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => JobOutcome::Failed {
                message: "Sort thread exited without a result".to_string(),
            },
        }
    }
}

impl JobRunner for ThreadRunner {
    fn run(&mut self, method: &str, mut data: Vec<i64>) -> JobOutcome {
        let method = method.to_string();
        self.run_with_deadline(format!("sort-{}", method), move || run_job(&method, &mut data))
    }
}

/// Runs each job on the calling thread, without a timeout
pub struct InProcessRunner;

impl JobRunner for InProcessRunner {
    fn run(&mut self, method: &str, mut data: Vec<i64>) -> JobOutcome {
        run_job(method, &mut data).into()
    }
}
