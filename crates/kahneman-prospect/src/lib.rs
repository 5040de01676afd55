#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kahneman/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod factor;
pub mod rolling;
pub mod value;
pub mod weighting;

pub use cache::WeightCache;
pub use config::ProspectConfig;
pub use error::ProspectError;
pub use factor::{ProspectColumns, ProspectTheoryFactor};
pub use rolling::RollingTKEngine;
pub use value::ValueTransform;
pub use weighting::ProbabilityWeighting;
