//! Job Executor
//!
//! ```text
//! JobDescriptor (from the instruction file)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Generate vector, run under timeout
//! └──────┬──────┘
//!        │  runner: process | thread | in-process
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build Report with system metadata
//! └─────────────┘
//! ```

mod execution;
mod metadata;
mod report;
mod runner;

pub use execution::{Harness, JobResult};
pub use report::build_report;
pub use runner::{InProcessRunner, JobRunner, ProcessRunner, ThreadRunner, build_runner};
