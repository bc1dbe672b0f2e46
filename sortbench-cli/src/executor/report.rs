//! Report Building
//!
//! Turns harness results into the renderer-agnostic [`Report`]. Known method
//! tags get their display name and analytic estimates; unknown tags are
//! reported verbatim.

use super::execution::JobResult;
use super::metadata::build_report_meta;
use sortbench_core::{JobOutcome, SortMethod};
use sortbench_report::{JobReportResult, JobStatus, Report, ReportConfig, ReportSummary};

/// Build a complete Report from execution results
pub fn build_report(
    results: &[JobResult],
    config: ReportConfig,
    skipped_lines: usize,
    total_duration_ms: f64,
) -> Report {
    let timeout_secs = config.timeout_secs;
    let results: Vec<JobReportResult> = results
        .iter()
        .map(|result| report_row(result, timeout_secs))
        .collect();

    Report {
        meta: build_report_meta(config),
        summary: ReportSummary::from_results(&results, skipped_lines, total_duration_ms),
        results,
    }
}

fn report_row(result: &JobResult, timeout_secs: f64) -> JobReportResult {
    let job = &result.descriptor;
    let method = job.method.parse::<SortMethod>().ok();
    let expected = method.map(|m| m.expected(job.size));

    let (status, error) = match &result.outcome {
        JobOutcome::Completed { .. } => (JobStatus::Completed, None),
        JobOutcome::TimedOut => (
            JobStatus::TimedOut,
            Some(format!("timed out after {}s", timeout_secs)),
        ),
        JobOutcome::Failed { message } => (JobStatus::Failed, Some(message.clone())),
    };

    JobReportResult {
        line: job.line,
        method_tag: job.method.clone(),
        method: method.map_or_else(|| job.method.clone(), |m| m.name().to_string()),
        size: job.size,
        vector_type: job.vector_type.clone(),
        status,
        time_secs: result.elapsed().map(|d| d.as_secs_f64()),
        comparisons: result.comparisons(),
        movements: result.movements(),
        expected_comparisons: expected.map(|e| e.comparisons),
        expected_movements: expected.map(|e| e.movements),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::JobDescriptor;
    use sortbench_core::Metrics;
    use std::time::Duration;

    fn descriptor(line: usize, method: &str) -> JobDescriptor {
        JobDescriptor {
            line,
            method: method.to_string(),
            size: 100,
            vector_type: "OrdC".to_string(),
        }
    }

    fn config() -> ReportConfig {
        ReportConfig {
            input: "input.txt".to_string(),
            timeout_secs: 2.0,
            isolation: "process".to_string(),
            one_shot: false,
            seed: None,
        }
    }

    #[test]
    fn test_build_report_rows() {
        let results = vec![
            JobResult {
                descriptor: descriptor(1, "Insert"),
                outcome: JobOutcome::Completed {
                    elapsed: Duration::from_micros(12),
                    metrics: Metrics::new(99, 198),
                },
            },
            JobResult {
                descriptor: descriptor(2, "Bubble"),
                outcome: JobOutcome::TimedOut,
            },
            JobResult {
                descriptor: descriptor(4, "Quick"),
                outcome: JobOutcome::Failed {
                    message: "no such method".to_string(),
                },
            },
        ];

        let report = build_report(&results, config(), 1, 42.0);

        let row = &report.results[0];
        assert_eq!(row.method, "Insertion Sort");
        assert_eq!(row.status, JobStatus::Completed);
        assert_eq!(row.comparisons, Some(99));
        assert_eq!(row.movements, Some(198));
        assert!(row.expected_comparisons.is_some());
        assert_eq!(row.time_secs, Some(0.000012));

        let row = &report.results[1];
        assert_eq!(row.method, "Bubble Sort");
        assert_eq!(row.status, JobStatus::TimedOut);
        assert_eq!(row.comparisons, None);
        assert_eq!(row.error.as_deref(), Some("timed out after 2s"));

        let row = &report.results[2];
        assert_eq!(row.method, "Quick");
        assert_eq!(row.line, 4);
        assert_eq!(row.expected_movements, None);
        assert_eq!(row.error.as_deref(), Some("no such method"));

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.completed, 1);
        assert_eq!(report.summary.timed_out, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.skipped_lines, 1);
        assert_eq!(report.meta.config.timeout_secs, 2.0);
    }
}
