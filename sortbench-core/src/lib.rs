#![warn(missing_docs)]
//! sortbench Core - Algorithms and Worker Runtime
//!
//! This crate provides everything that runs inside a job:
//! - Six instrumented sorts that count comparisons and movements
//! - `SortMethod` registry mapping instruction tags to algorithms
//! - Input vector generation (ascending, descending, random without replacement)
//! - `run_job`, the timed and panic-safe execution primitive
//! - `WorkerMain`, the child-process loop driven by the supervisor

mod generator;
mod job;
mod method;
mod metrics;
pub mod sorts;
mod worker;

pub use generator::{GeneratorError, VectorKind, generate_vector};
pub use job::{JobError, JobOutcome, SortRun, panic_message, run_job};
pub use method::{Estimate, SortMethod, UnknownMethod};
pub use metrics::{Counter, Metrics};
pub use worker::WorkerMain;
