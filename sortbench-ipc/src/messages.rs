//! IPC Message Types

use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};

/// A job shipped from the supervisor to a worker.
///
/// The method travels as its raw tag so an unknown method is reported by the
/// worker as a job failure rather than rejected by the supervisor.
#[derive(Debug, Clone, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct JobRequest {
    /// Sequence number, echoed back in the reply
    pub job_id: u64,
    /// Method tag (`Insert`, `Shell`, ...)
    pub method: String,
    /// Input vector to sort
    pub data: Vec<i64>,
}

/// Commands sent from Supervisor to Worker
#[derive(Debug, Clone, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub enum SupervisorCommand {
    /// Sort the given vector
    Run(JobRequest),

    /// Exit the worker loop
    Shutdown,
}

/// Worker capabilities advertised during handshake
#[derive(Debug, Clone, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct WorkerCapabilities {
    /// Protocol version for compatibility
    pub protocol_version: u32,
    /// Worker process id
    pub pid: u32,
    /// Number of logical CPUs available
    pub cpu_count: u32,
}

impl Default for WorkerCapabilities {
    fn default() -> Self {
        Self {
            protocol_version: crate::PROTOCOL_VERSION,
            pid: std::process::id(),
            cpu_count: num_cpus(),
        }
    }
}

/// Messages sent from Worker to Supervisor
#[derive(Debug, Clone, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub enum WorkerMessage {
    /// Initial handshake with worker capabilities
    Hello(WorkerCapabilities),

    /// Sort finished
    Complete {
        /// Job this result belongs to
        job_id: u64,
        /// Comparisons counted by the sort
        comparisons: u64,
        /// Movements counted by the sort
        movements: u64,
        /// Wall-clock time of the sort in nanoseconds
        duration_nanos: u64,
    },

    /// Sort could not run or panicked
    Failure {
        /// Job this result belongs to
        job_id: u64,
        /// Error category
        kind: FailureKind,
        /// Human-readable error message
        message: String,
        /// Optional backtrace
        backtrace: Option<String>,
    },
}

/// Categories of job failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub enum FailureKind {
    /// Rust panic (caught)
    Panic,
    /// Method tag did not resolve
    UnknownMethod,
}

fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|p| p.get() as u32)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_capabilities_default() {
        let caps = WorkerCapabilities::default();
        assert_eq!(caps.protocol_version, crate::PROTOCOL_VERSION);
        assert_eq!(caps.pid, std::process::id());
        assert!(caps.cpu_count >= 1);
    }
}
