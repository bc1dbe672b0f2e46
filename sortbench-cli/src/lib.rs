#![warn(missing_docs)]
//! sortbench CLI Library
//!
//! Reads an instruction file, runs every sort under a hard timeout and writes
//! the results table. The same binary doubles as its own worker process: the
//! supervisor re-executes it with `--sort-worker`.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     sortbench_cli::run()
//! }
//! ```

mod config;
mod executor;
mod instructions;
mod supervisor;

pub use config::*;
pub use executor::{
    Harness, InProcessRunner, JobResult, JobRunner, ProcessRunner, ThreadRunner, build_report,
    build_runner,
};
pub use instructions::{
    InstructionError, InstructionSet, JobDescriptor, filter_jobs, parse_instruction,
    parse_instructions, read_instructions,
};
pub use supervisor::*;

use anyhow::Context;
use clap::{Parser, Subcommand};
use regex::Regex;
use sortbench_core::{SortMethod, VectorKind, WorkerMain};
use sortbench_report::{OutputFormat, ReportConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// sortbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sortbench")]
#[command(author, version, about = "sortbench - instrumented sorting algorithm harness")]
pub struct Cli {
    /// Optional subcommand (Run, List, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Instruction file, one `method,size,vectorType` per line
    /// (default: sortbench.toml [input] path, else input.txt)
    pub input: Option<PathBuf>,

    /// Report file (default: sortbench.toml [output] path, else output.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format: table, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Per-job timeout in seconds (default: 7200)
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Isolation mode: process, thread, in-process (thread mode leaves a timed-out sort running and holding its memory)
    #[arg(long)]
    pub isolation: Option<String>,

    /// Use a fresh worker process for every job
    #[arg(long)]
    pub one_shot: bool,

    /// Seed for random (OrdA) vectors
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only run jobs whose `method,size,vectorType` matches this regex
    #[arg(long)]
    pub filter: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: Run as worker process (used by supervisor)
    #[arg(long = "sort-worker", hide = true)]
    pub sort_worker: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run all jobs (default)
    Run,
    /// Parse the instruction file and print the plan without running it
    List,
    /// Write a default sortbench.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Fully resolved run settings: CLI flags over sortbench.toml over defaults
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Instruction file
    pub input: PathBuf,
    /// Report file
    pub output: PathBuf,
    /// Report format
    pub format: OutputFormat,
    /// Per-job timeout
    pub timeout: Duration,
    /// Isolation mode
    pub isolation: IsolationMode,
    /// Fresh worker per job
    pub one_shot: bool,
    /// Random vector seed
    pub seed: Option<u64>,
    /// Job filter
    pub filter: Option<Regex>,
}

impl RunSettings {
    /// Layer CLI overrides on top of `config`
    pub fn resolve(cli: &Cli, config: &SortbenchConfig) -> anyhow::Result<Self> {
        let input = cli
            .input
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.input.path));
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.path));

        let format: OutputFormat = cli
            .format
            .as_deref()
            .unwrap_or(&config.output.format)
            .parse()
            .map_err(anyhow::Error::msg)?;

        let timeout = match cli.timeout {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid --timeout {}", secs))?,
            None => SortbenchConfig::parse_duration(&config.runner.timeout)
                .with_context(|| format!("invalid runner.timeout {:?}", config.runner.timeout))?,
        };
        if timeout.is_zero() {
            anyhow::bail!("timeout must be greater than zero");
        }

        let isolation = match cli.isolation.as_deref() {
            Some(mode) => mode.parse()?,
            None => config.runner.isolation,
        };

        let filter = cli
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid --filter pattern")?;

        Ok(Self {
            input,
            output,
            format,
            timeout,
            isolation,
            one_shot: cli.one_shot || config.runner.one_shot,
            seed: cli.seed.or(config.runner.seed),
            filter,
        })
    }

    fn report_config(&self) -> ReportConfig {
        ReportConfig {
            input: self.input.display().to_string(),
            timeout_secs: self.timeout.as_secs_f64(),
            isolation: self.isolation.to_string(),
            one_shot: self.one_shot,
            seed: self.seed,
        }
    }
}

/// Run the sortbench CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the sortbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Worker mode first, before any other initialization
    if cli.sort_worker {
        return run_worker_mode();
    }

    init_logging(if cli.verbose {
        "sortbench=debug"
    } else {
        "sortbench=info"
    });

    let config = SortbenchConfig::discover().unwrap_or_default();

    match cli.command {
        Some(Commands::Init { force }) => init_config(force),
        Some(Commands::List) => list_jobs(&cli, &config),
        Some(Commands::Run) | None => run_jobs(&cli, &config),
    }
}

/// Logs go to stderr so stdout stays clean. `RUST_LOG` wins over `default`.
fn init_logging(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run as a worker process (IPC mode)
fn run_worker_mode() -> anyhow::Result<()> {
    init_logging("sortbench=warn");
    let mut worker = WorkerMain::new();
    worker
        .run()
        .map_err(|e| anyhow::anyhow!("Worker error: {}", e))
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(&path, SortbenchConfig::default_toml())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn load_jobs(settings: &RunSettings) -> anyhow::Result<(Vec<JobDescriptor>, usize)> {
    let set = read_instructions(&settings.input).with_context(|| {
        format!(
            "failed to read instructions from {}",
            settings.input.display()
        )
    })?;
    let jobs = filter_jobs(set.jobs, settings.filter.as_ref());
    Ok((jobs, set.skipped))
}

fn list_jobs(cli: &Cli, config: &SortbenchConfig) -> anyhow::Result<()> {
    let settings = RunSettings::resolve(cli, config)?;
    let (jobs, skipped) = load_jobs(&settings)?;

    println!("sortbench plan ({}):", settings.input.display());
    for job in &jobs {
        let method = match job.method.parse::<SortMethod>() {
            Ok(method) => method.name().to_string(),
            Err(_) => format!("{} (unknown method)", job.method),
        };
        let vector = match job.vector_type.parse::<VectorKind>() {
            Ok(_) => job.vector_type.clone(),
            Err(_) => format!("{} (unknown vector type)", job.vector_type),
        };
        println!("├── line {}: {} × {} {}", job.line, method, job.size, vector);
    }
    println!("{} jobs, {} lines skipped.", jobs.len(), skipped);

    Ok(())
}

fn run_jobs(cli: &Cli, config: &SortbenchConfig) -> anyhow::Result<()> {
    let settings = RunSettings::resolve(cli, config)?;
    let (jobs, skipped) = load_jobs(&settings)?;

    tracing::info!(
        "running {} jobs ({} isolation{}, timeout {:?})",
        jobs.len(),
        settings.isolation,
        if settings.one_shot { ", one-shot" } else { "" },
        settings.timeout
    );

    let start_time = Instant::now();

    let runner = build_runner(settings.isolation, settings.timeout, settings.one_shot);
    let results = Harness::new(runner, settings.seed).execute(&jobs);

    let total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    let report = build_report(&results, settings.report_config(), skipped, total_duration_ms);

    let output = settings.format.render(&report)?;
    std::fs::write(&settings.output, output)
        .with_context(|| format!("failed to write {}", settings.output.display()))?;

    let summary = &report.summary;
    println!(
        "{} completed, {} timed out, {} failed ({} lines skipped)",
        summary.completed, summary.timed_out, summary.failed, summary.skipped_lines
    );
    println!("Results saved to {}", settings.output.display());

    Ok(())
}
