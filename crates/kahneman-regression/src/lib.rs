#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kahneman/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod absorb;
pub mod cross_section;
pub mod error;
pub mod ols;
pub mod summary;

pub use cross_section::{
    CONST_KEY, CrossSectionalFit, CrossSectionalRegressor, PeriodCoefficients, PeriodFit, RSQ_KEY,
    SkipReason, SkippedPeriod,
};
pub use error::RegressionError;
pub use ols::{OlsFit, ols};
pub use summary::{CoefficientSummarizer, CoefficientSummary, SummaryEntry};
