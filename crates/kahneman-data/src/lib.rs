#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kahneman/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod benchmark;
pub mod error;
pub mod frame;
pub mod panel;
pub mod period;

pub use benchmark::{BenchmarkFactors, BenchmarkRow, BenchmarkSchema};
pub use error::{DataError, Result};
pub use panel::{Field, Observation, Panel, PanelSchema, SecurityId};
pub use period::Period;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
