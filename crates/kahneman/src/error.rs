//! Error types for experiment runs.

use thiserror::Error;

/// Errors that can occur while running experiments.
#[derive(Debug, Error)]
pub enum ExperimentError {
    /// Panel data error
    #[error("Data error: {0}")]
    Data(#[from] kahneman_data::DataError),

    /// Prospect theory error
    #[error("Prospect theory error: {0}")]
    Prospect(#[from] kahneman_prospect::ProspectError),

    /// Regression error
    #[error("Regression error: {0}")]
    Regression(#[from] kahneman_regression::RegressionError),

    /// Portfolio error
    #[error("Portfolio error: {0}")]
    Portfolio(#[from] kahneman_portfolio::PortfolioError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration is well formed but unusable
    #[error("Invalid configuration '{name}': {reason}")]
    InvalidConfig {
        /// Configuration name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A train or test split has no observations
    #[error("Experiment '{name}': {split} split is empty")]
    EmptySplit {
        /// Configuration name
        name: String,
        /// "train" or "test"
        split: &'static str,
    },

    /// No feature passed the significance threshold
    #[error("Experiment '{name}': no significant features")]
    NoSignificantFeatures {
        /// Configuration name
        name: String,
    },
}
