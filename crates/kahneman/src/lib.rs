#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kahneman/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod experiment;
pub mod signal;

// Re-export main types from sub-crates
pub use kahneman_data as data;
pub use kahneman_output as output;
pub use kahneman_portfolio as portfolio;
pub use kahneman_prospect as prospect;
pub use kahneman_regression as regression;

pub use config::{ExperimentConfig, TrainFrequency};
pub use error::ExperimentError;
pub use experiment::{ExperimentBatch, ExperimentEvent, ExperimentRunner, FailedExperiment};
pub use signal::{TK_FEATURE, attach_prospect_signal};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
