//! Prospect theory parameters.

use crate::error::ProspectError;
use serde::{Deserialize, Serialize};

/// Configuration for the TK signal
///
/// Defaults are the Tversky and Kahneman (1992) estimates with a 36-month
/// window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectConfig {
    /// Value function curvature (default: 0.88)
    pub alpha: f64,
    /// Loss aversion (default: 2.25)
    pub lambda: f64,
    /// Probability weighting curvature for gains (default: 0.61)
    pub gamma: f64,
    /// Probability weighting curvature for losses (default: 0.69)
    pub theta: f64,
    /// Trailing window in periods (default: 36)
    pub window: usize,
    /// Maximum number of cached weight vectors (default: 1024)
    pub cache_capacity: usize,
}

impl Default for ProspectConfig {
    fn default() -> Self {
        Self {
            alpha: 0.88,
            lambda: 2.25,
            gamma: 0.61,
            theta: 0.69,
            window: 36,
            cache_capacity: 1024,
        }
    }
}

impl ProspectConfig {
    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<(), ProspectError> {
        let positive = [
            ("alpha", self.alpha),
            ("lambda", self.lambda),
            ("gamma", self.gamma),
            ("theta", self.theta),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ProspectError::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.window == 0 {
            return Err(ProspectError::InvalidParameter(
                "window must be at least 1".to_string(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(ProspectError::InvalidParameter(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
