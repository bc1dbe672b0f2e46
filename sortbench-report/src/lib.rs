#![warn(missing_docs)]
//! sortbench Report - Result Model and Output Formats
//!
//! Generates:
//! - Table (fixed-width text, the default `output.txt` layout)
//! - JSON (machine-readable, full report)
//! - CSV (spreadsheet-compatible)

mod csv;
mod json;
mod report;
mod table;

pub use csv::generate_csv_report;
pub use json::generate_json_report;
pub use report::{
    JobReportResult, JobStatus, Report, ReportConfig, ReportMeta, ReportSummary, SystemInfo,
};
pub use table::{format_seconds, generate_table_report};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Fixed-width text table
    Table,
    /// JSON with full schema
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl OutputFormat {
    /// Render `report` in this format
    pub fn render(self, report: &Report) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Table => Ok(generate_table_report(report)),
            OutputFormat::Json => generate_json_report(report),
            OutputFormat::Csv => Ok(generate_csv_report(report)),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" | "human" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!("table".parse(), Ok(OutputFormat::Table));
        assert_eq!("Human".parse(), Ok(OutputFormat::Table));
        assert_eq!("JSON".parse(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse(), Ok(OutputFormat::Csv));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
