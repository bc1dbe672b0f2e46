//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// One entry per executed job, in instruction order
    pub results: Vec<JobReportResult>,
    /// Outcome counts
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// sortbench version that produced the report
    pub version: String,
    /// UTC time the report was generated
    pub timestamp: DateTime<Utc>,
    /// Machine the jobs ran on
    pub system: SystemInfo,
    /// Runner settings
    pub config: ReportConfig,
}

/// Runner configuration captured in report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Instruction file the jobs came from
    pub input: String,
    /// Per-job timeout in seconds
    pub timeout_secs: f64,
    /// Isolation mode (`process`, `thread`, `in-process`)
    pub isolation: String,
    /// Whether every job got a fresh worker process
    pub one_shot: bool,
    /// Seed for random vectors, if fixed
    pub seed: Option<u64>,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// CPU model name
    pub cpu: String,
    /// Logical cores
    pub cpu_cores: u32,
    /// Total RAM in GB (0 when unknown)
    pub memory_gb: f64,
}

/// Terminal state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Sort finished and reported metrics
    Completed,
    /// Sort exceeded the timeout
    TimedOut,
    /// Sort could not run or crashed
    Failed,
}

/// Individual job result in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReportResult {
    /// 1-based line of the instruction
    pub line: usize,
    /// Raw method tag from the instruction
    pub method_tag: String,
    /// Display name (`Insertion Sort`), or the raw tag when unknown
    pub method: String,
    /// Vector length
    pub size: usize,
    /// Raw vector type tag
    pub vector_type: String,
    /// Outcome
    pub status: JobStatus,
    /// Sort wall-clock time in seconds
    pub time_secs: Option<f64>,
    /// Measured comparisons
    pub comparisons: Option<u64>,
    /// Measured movements
    pub movements: Option<u64>,
    /// Analytic comparison estimate for this method and size
    pub expected_comparisons: Option<f64>,
    /// Analytic movement estimate for this method and size
    pub expected_movements: Option<f64>,
    /// Diagnostic for timed-out or failed jobs
    pub error: Option<String>,
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Jobs executed
    pub total: usize,
    /// Jobs that completed
    pub completed: usize,
    /// Jobs that hit the timeout
    pub timed_out: usize,
    /// Jobs that failed
    pub failed: usize,
    /// Instruction lines skipped as malformed
    pub skipped_lines: usize,
    /// Wall-clock duration of the whole run in milliseconds
    pub total_duration_ms: f64,
}

impl ReportSummary {
    /// Tally outcomes from `results`
    pub fn from_results(
        results: &[JobReportResult],
        skipped_lines: usize,
        total_duration_ms: f64,
    ) -> Self {
        let count = |status: JobStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            completed: count(JobStatus::Completed),
            timed_out: count(JobStatus::TimedOut),
            failed: count(JobStatus::Failed),
            skipped_lines,
            total_duration_ms,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_report() -> Report {
    let completed = JobReportResult {
        line: 1,
        method_tag: "Insert".to_string(),
        method: "Insertion Sort".to_string(),
        size: 100,
        vector_type: "OrdC".to_string(),
        status: JobStatus::Completed,
        time_secs: Some(0.0000123),
        comparisons: Some(99),
        movements: Some(198),
        expected_comparisons: Some(2475.0),
        expected_movements: Some(2772.0),
        error: None,
    };
    let timed_out = JobReportResult {
        line: 2,
        method_tag: "Select".to_string(),
        method: "Selection Sort".to_string(),
        size: 1_000_000,
        vector_type: "OrdA".to_string(),
        status: JobStatus::TimedOut,
        time_secs: None,
        comparisons: None,
        movements: None,
        expected_comparisons: None,
        expected_movements: None,
        error: Some("timed out after 7200s".to_string()),
    };
    let failed = JobReportResult {
        line: 3,
        method_tag: "Quick".to_string(),
        method: "Quick".to_string(),
        size: 10,
        vector_type: "OrdD".to_string(),
        status: JobStatus::Failed,
        error: Some("Unknown sort method: \"Quick\"".to_string()),
        ..timed_out.clone()
    };
    let results = vec![completed, timed_out, failed];

    Report {
        meta: ReportMeta {
            version: "0.1.0".to_string(),
            timestamp: Utc::now(),
            system: SystemInfo {
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                cpu: "Test CPU".to_string(),
                cpu_cores: 8,
                memory_gb: 16.0,
            },
            config: ReportConfig {
                input: "input.txt".to_string(),
                timeout_secs: 7200.0,
                isolation: "process".to_string(),
                one_shot: false,
                seed: Some(42),
            },
        },
        summary: ReportSummary::from_results(&results, 1, 12.5),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_statuses() {
        let report = sample_report();
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.completed, 1);
        assert_eq!(report.summary.timed_out, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.skipped_lines, 1);
    }

    #[test]
    fn test_json_shape() {
        let report = sample_report();
        let json = crate::generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"][0]["status"], "completed");
        assert_eq!(value["results"][1]["status"], "timed_out");
        assert_eq!(value["results"][1]["comparisons"], serde_json::Value::Null);
        assert_eq!(value["meta"]["config"]["seed"], 42);
    }
}
