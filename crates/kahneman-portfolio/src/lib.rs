#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kahneman/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod error;
pub mod performance;
pub mod ranking;

pub use builder::{PortfolioBuilder, PortfolioReturn, log_compounded_mean};
pub use error::PortfolioError;
pub use performance::{CarhartFit, LegStats, PerformanceEvaluator, PortfolioPerformance};
pub use ranking::{RankedObservation, RankingConfig, Rebalance, ScoreRanker, decile};
