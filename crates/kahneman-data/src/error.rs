//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is absent from the input frame
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Column name that is neither a schema column nor a feature
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Period that is not a valid yyyymm value
    #[error("Invalid period: {0}")]
    InvalidPeriod(i64),

    /// Date that could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Row with a missing key column
    #[error("Missing {column} at row {row}")]
    MissingKey {
        /// Key column name
        column: String,
        /// Zero-based row index
        row: usize,
    },

    /// Column length does not match the panel
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected number of values
        expected: usize,
        /// Actual number of values
        actual: usize,
    },

    /// Feature column already present
    #[error("Duplicate feature: {0}")]
    DuplicateFeature(String),
}
