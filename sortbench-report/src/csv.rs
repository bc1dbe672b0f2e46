//! CSV Output

use crate::report::{JobStatus, Report};

/// Generate a CSV report, one row per job.
///
/// Missing values (timeouts, failures) are empty fields.
pub fn generate_csv_report(report: &Report) -> String {
    let mut output = String::new();
    output.push_str(
        "line,method,size,vector_type,status,time_s,comparisons,movements,expected_comparisons,expected_movements,error\n",
    );

    for r in &report.results {
        let status = match r.status {
            JobStatus::Completed => "completed",
            JobStatus::TimedOut => "timed_out",
            JobStatus::Failed => "failed",
        };
        let opt = |v: Option<String>| v.unwrap_or_default();

        output.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            r.line,
            escape(&r.method),
            r.size,
            escape(&r.vector_type),
            status,
            opt(r.time_secs.map(|t| format!("{:.9}", t))),
            opt(r.comparisons.map(|c| c.to_string())),
            opt(r.movements.map(|m| m.to_string())),
            opt(r.expected_comparisons.map(|c| format!("{:.2}", c))),
            opt(r.expected_movements.map(|m| format!("{:.2}", m))),
            escape(r.error.as_deref().unwrap_or("")),
        ));
    }

    output
}

/// Quote a field if it contains a delimiter, quote or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
