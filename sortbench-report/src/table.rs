//! Fixed-Width Table Output
//!
//! The layout of the classic `output.txt`:
//!
//! ```text
//! +----------------+---------+-------------+----------+-------------+-----------+
//! |     Method     |   Size  | Vector Type | Time (s) | Comparisons | Movements |
//! +----------------+---------+-------------+----------+-------------+-----------+
//! | Insertion Sort |     100 | OrdC        | 1.23e-05 |          99 |       198 |
//! +----------------+---------+-------------+----------+-------------+-----------+
//! ```
//!
//! Timed-out jobs show `TIMEOUT` in the time column and `N/A` in the counters;
//! failed jobs show `FAILED` and `N/A`.

use crate::report::{JobReportResult, JobStatus, Report};

const BORDER: &str =
    "+----------------+---------+-------------+----------+-------------+-----------+\n";
const HEADER: &str =
    "|     Method     |   Size  | Vector Type | Time (s) | Comparisons | Movements |\n";

/// Render the report as the fixed-width results table.
pub fn generate_table_report(report: &Report) -> String {
    let mut output = String::new();
    output.push_str(BORDER);
    output.push_str(HEADER);
    output.push_str(BORDER);

    for result in &report.results {
        output.push_str(&format_row(result));
    }

    output.push_str(BORDER);
    output
}

fn format_row(result: &JobReportResult) -> String {
    let time = match (result.status, result.time_secs) {
        (JobStatus::Completed, Some(secs)) => format_seconds(secs),
        (JobStatus::TimedOut, _) => "TIMEOUT".to_string(),
        (JobStatus::Failed, _) => "FAILED".to_string(),
        (JobStatus::Completed, None) => "N/A".to_string(),
    };
    let count = |value: Option<u64>| value.map_or_else(|| "N/A".to_string(), |v| v.to_string());

    format!(
        "| {:<14} | {:>7} | {:<11} | {:>8} | {:>11} | {:>9} |\n",
        result.method,
        result.size,
        result.vector_type,
        time,
        count(result.comparisons),
        count(result.movements),
    )
}

/// Format seconds in two-digit scientific notation with a signed,
/// zero-padded exponent (`1.23e-05`).
pub fn format_seconds(secs: f64) -> String {
    let formatted = format!("{:.2e}", secs);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            Err(_) => formatted,
        },
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_report;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0000123), "1.23e-05");
        assert_eq!(format_seconds(1.5), "1.50e+00");
        assert_eq!(format_seconds(7200.0), "7.20e+03");
        assert_eq!(format_seconds(0.0), "0.00e+00");
    }

    #[test]
    fn test_table_layout() {
        let table = generate_table_report(&sample_report());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], BORDER.trim_end());
        assert_eq!(lines[1], HEADER.trim_end());
        assert_eq!(
            lines[3],
            "| Insertion Sort |     100 | OrdC        | 1.23e-05 |          99 |       198 |"
        );
        // Rows line up with the border while every value fits its column
        for line in &lines[..5] {
            assert_eq!(line.len(), lines[0].len(), "{line}");
        }
    }

    #[test]
    fn test_missing_metrics_render_placeholders() {
        let table = generate_table_report(&sample_report());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(
            lines[4],
            "| Selection Sort | 1000000 | OrdA        |  TIMEOUT |         N/A |       N/A |"
        );
        assert_eq!(
            lines[5],
            "| Quick          |      10 | OrdD        |   FAILED |         N/A |       N/A |"
        );
    }
}
