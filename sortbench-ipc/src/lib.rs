#![warn(missing_docs)]
//! sortbench IPC Protocol
//!
//! Length-prefixed rkyv frames exchanged between the harness (supervisor) and
//! a worker process that runs one sort at a time. The supervisor sends a job
//! together with its materialized input vector; the worker answers with the
//! measured counts or a failure.

mod framing;
mod messages;

pub use framing::{FrameError, FrameReader, FrameWriter, MAX_FRAME_SIZE, read_frame, write_frame};
pub use messages::{FailureKind, JobRequest, SupervisorCommand, WorkerCapabilities, WorkerMessage};

/// Protocol version for compatibility checking
pub const PROTOCOL_VERSION: u32 = 1;

/// Environment variable carrying the inherited `<read_fd>,<write_fd>` pair
pub const IPC_FD_ENV: &str = "SORTBENCH_IPC_FD";

/// Command-line flag that switches the binary into worker mode
pub const WORKER_FLAG: &str = "--sort-worker";
