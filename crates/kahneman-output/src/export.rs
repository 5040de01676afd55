//! Export of experiment results.
//!
//! Result rows are written as CSV with one header line, or as a JSON array.
//! Non-finite values become `NaN` in CSV and `null` in JSON.

use crate::summary::ExperimentSummary;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not valid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn serialize_rows<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for row in rows {
                wtr.serialize(row)?;
            }
            let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
            Ok(String::from_utf8(bytes)?)
        }
        ExportFormat::Json => Ok(serde_json::to_string(rows)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(rows)?),
    }
}

impl Exporter for ExperimentSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        serialize_rows(std::slice::from_ref(self), format)
    }
}

impl Exporter for [ExperimentSummary] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        serialize_rows(self, format)
    }
}

impl Exporter for Vec<ExperimentSummary> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        serialize_rows(self, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::SplitPerformance;
    use kahneman_portfolio::{LegStats, PortfolioPerformance};
    use rstest::rstest;
    use std::io::Read;

    fn row(name: &str) -> ExperimentSummary {
        let leg = LegStats {
            mean: 0.75,
            std_dev: 1.5,
            sharpe: 0.5,
            count: 10,
        };
        let performance = PortfolioPerformance {
            long: leg,
            short: leg,
            spread: leg,
            carhart: None,
        };
        ExperimentSummary::new(
            name,
            2,
            &SplitPerformance {
                train: performance,
                valid: performance,
            },
        )
    }

    #[test]
    fn test_csv_header_and_rows() {
        let rows = vec![row("base"), row("tk")];
        let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name,significant_vars,train_m_L,train_m_S,train_m_LS"));
        assert!(lines[0].ends_with("train_pval,valid_pval"));
        assert!(lines[1].starts_with("base,2,0.75"));
        assert!(lines[2].contains("NaN"));
    }

    #[test]
    fn test_json_nan_is_null() {
        let json = row("base").export_to_string(ExportFormat::Json).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"train_alpha\":null"));
    }

    #[test]
    fn test_pretty_json() {
        let json = vec![row("base")].export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("  \"name\": \"base\""));
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    fn test_parse_format(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_format() {
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join("kahneman_export_test.csv");
        vec![row("base")].export_to_file(&path, ExportFormat::Csv).unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.contains("base"));

        std::fs::remove_file(path).ok();
    }
}
