//! Instruction File Parsing
//!
//! One job per line, `method,size,vectorType`, fields trimmed:
//!
//! ```text
//! Insert,1000,OrdC
//! Heap, 50000, OrdA
//! # comment
//! ```
//!
//! Malformed lines (wrong field count, non-integer size) are skipped with a
//! warning. Method and vector tags are kept raw and resolved at dispatch, so
//! an unknown tag shows up in the report as a failed job instead of vanishing.

use regex::Regex;
use std::path::Path;
use thiserror::Error;

/// One parsed instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    /// 1-based line number in the instruction file
    pub line: usize,
    /// Raw method tag
    pub method: String,
    /// Vector length
    pub size: usize,
    /// Raw vector type tag
    pub vector_type: String,
}

impl JobDescriptor {
    /// `method,size,vectorType` key used for filtering and logging
    pub fn key(&self) -> String {
        format!("{},{},{}", self.method, self.size, self.vector_type)
    }
}

/// A line that could not be turned into a job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionError {
    /// Not exactly `method,size,vectorType`
    #[error("line {line}: expected 3 comma-separated fields, found {found}")]
    FieldCount {
        /// 1-based line number
        line: usize,
        /// Fields present on the line
        found: usize,
    },

    /// Size field is not a non-negative integer
    #[error("line {line}: size {value:?} is not a non-negative integer")]
    InvalidSize {
        /// 1-based line number
        line: usize,
        /// Offending field
        value: String,
    },
}

/// Jobs in file order plus the count of skipped lines
#[derive(Debug, Clone, Default)]
pub struct InstructionSet {
    /// Parsed jobs
    pub jobs: Vec<JobDescriptor>,
    /// Malformed lines that were skipped
    pub skipped: usize,
}

/// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_instruction(
    line_no: usize,
    line: &str,
) -> Result<Option<JobDescriptor>, InstructionError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    let [method, size, vector_type] = fields.as_slice() else {
        return Err(InstructionError::FieldCount {
            line: line_no,
            found: fields.len(),
        });
    };

    let size = size.parse::<usize>().map_err(|_| InstructionError::InvalidSize {
        line: line_no,
        value: size.to_string(),
    })?;

    Ok(Some(JobDescriptor {
        line: line_no,
        method: method.to_string(),
        size,
        vector_type: vector_type.to_string(),
    }))
}

/// Parse a whole instruction file, skipping malformed lines.
pub fn parse_instructions(text: &str) -> InstructionSet {
    let mut set = InstructionSet::default();
    for (index, line) in text.lines().enumerate() {
        match parse_instruction(index + 1, line) {
            Ok(Some(job)) => set.jobs.push(job),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("skipping instruction: {}", e);
                set.skipped += 1;
            }
        }
    }
    set
}

/// Read and parse an instruction file.
pub fn read_instructions(path: impl AsRef<Path>) -> std::io::Result<InstructionSet> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_instructions(&text))
}

/// Keep jobs whose `method,size,vectorType` key matches `filter`.
pub fn filter_jobs(jobs: Vec<JobDescriptor>, filter: Option<&Regex>) -> Vec<JobDescriptor> {
    match filter {
        Some(re) => jobs.into_iter().filter(|job| re.is_match(&job.key())).collect(),
        None => jobs,
    }
}
