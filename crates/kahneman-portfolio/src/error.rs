//! Error types for portfolio formation.

use thiserror::Error;

/// Errors that can occur while ranking or evaluating portfolios.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Panel data error
    #[error("Data error: {0}")]
    Data(#[from] kahneman_data::DataError),

    /// Regression error
    #[error("Regression error: {0}")]
    Regression(#[from] kahneman_regression::RegressionError),

    /// Ranking weight refers to a coefficient that was not estimated
    #[error("No t-statistic for feature: {0}")]
    MissingWeight(String),

    /// Invalid ranking configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
