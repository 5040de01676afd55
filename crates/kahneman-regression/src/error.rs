//! Error types for regression.

use thiserror::Error;

/// Errors that can occur while fitting regressions.
#[derive(Debug, Error)]
pub enum RegressionError {
    /// Panel data error
    #[error("Data error: {0}")]
    Data(#[from] kahneman_data::DataError),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Design matrix is rank deficient
    #[error("Singular design matrix")]
    Singular,

    /// Fewer observations than parameters
    #[error("Insufficient data: {observations} observations for {parameters} parameters")]
    InsufficientObservations {
        /// Number of usable observations
        observations: usize,
        /// Number of parameters, including absorbed effects
        parameters: usize,
    },
}
