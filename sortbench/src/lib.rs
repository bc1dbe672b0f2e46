#![warn(missing_docs)]
//! # sortbench
//!
//! Instrumented classic sorting algorithms and a timeout-bounded harness.
//!
//! - **Six sorts**: bubble, insertion, selection, shell, merge and heap, each
//!   counting comparisons and element movements
//! - **Instruction files**: `method,size,vectorType` per line, e.g. `Heap,50000,OrdA`
//! - **Hard timeouts**: every sort runs in a worker process that is killed
//!   when it overruns, so one runaway job never blocks the rest
//! - **Reports**: fixed-width table (the classic `output.txt`), JSON or CSV
//!
//! ## Library Use
//!
//! ```
//! use sortbench::{Metrics, SortMethod};
//!
//! let mut data = vec![3, 2, 1, 5, 4];
//! let metrics = SortMethod::Selection.sort(&mut data);
//! assert_eq!(data, [1, 2, 3, 4, 5]);
//! assert_eq!(metrics, Metrics::new(10, 6));
//! ```

pub use sortbench_core::{
    Counter, Estimate, GeneratorError, JobError, JobOutcome, Metrics, SortMethod, SortRun,
    UnknownMethod, VectorKind, generate_vector, run_job, sorts,
};

pub use sortbench_cli::{
    Harness, InProcessRunner, IsolationMode, JobDescriptor, JobResult, JobRunner, ProcessRunner,
    SortbenchConfig, ThreadRunner, WorkerHandle, build_report, build_runner, parse_instructions,
    read_instructions, run,
};

pub use sortbench_report::{
    JobStatus, OutputFormat, Report, generate_csv_report, generate_json_report,
    generate_table_report,
};
