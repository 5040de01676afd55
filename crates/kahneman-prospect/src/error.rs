//! Error types for prospect theory computation.

use thiserror::Error;

/// Errors that can occur while computing the TK signal.
#[derive(Debug, Error)]
pub enum ProspectError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// A required column is absent from the input frame
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Row with a missing security identifier
    #[error("Missing security identifier at row {0}")]
    MissingSecurity(usize),

    /// Parameter outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
