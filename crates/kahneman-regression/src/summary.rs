//! Fama-MacBeth second pass
//!
//! Averages the per-period coefficients and tests them against zero.

use crate::cross_section::{CONST_KEY, CrossSectionalFit, RSQ_KEY};
use serde::{Deserialize, Serialize};

/// Time-series statistics of one coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Coefficient name
    pub name: String,
    /// Mean over the periods where the coefficient was estimated
    pub mean: f64,
    /// Sample standard deviation over the same periods
    pub std_dev: f64,
    /// `mean / std_dev * sqrt(n)` with `n` the number of fitted periods
    pub t_stat: f64,
    /// Periods where the coefficient was estimated
    pub count: usize,
}

/// Summary rows in feature order, then `const` and `Rsq`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoefficientSummary {
    entries: Vec<SummaryEntry>,
    periods: usize,
}

impl CoefficientSummary {
    /// All rows.
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    /// Number of fitted periods behind the summary.
    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Whether the summary has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row for a coefficient.
    pub fn get(&self, name: &str) -> Option<&SummaryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// t-statistic of a coefficient.
    pub fn t_stat(&self, name: &str) -> Option<f64> {
        self.get(name).map(|e| e.t_stat)
    }

    /// Features whose |t| exceeds `threshold`, excluding the constant and R².
    pub fn significant_features(&self, threshold: f64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.name != CONST_KEY && e.name != RSQ_KEY)
            .filter(|e| e.t_stat.abs() > threshold)
            .map(|e| e.name.clone())
            .collect()
    }
}

/// Computes [`CoefficientSummary`] from per-period fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoefficientSummarizer;

impl CoefficientSummarizer {
    /// |t| above which a feature counts as significant.
    pub const SIGNIFICANCE_THRESHOLD: f64 = 1.5;

    /// Summarize a cross-sectional fit.
    ///
    /// Coefficients dropped in some periods are averaged over the periods
    /// that estimated them, but the t-statistic always scales by the square
    /// root of the total number of fitted periods. Coefficients never
    /// estimated are left out.
    pub fn summarize(fit: &CrossSectionalFit) -> CoefficientSummary {
        let periods = fit.coefficients.len();
        let sqrt_n = (periods as f64).sqrt();

        let names = fit
            .features
            .iter()
            .map(String::as_str)
            .chain([CONST_KEY, RSQ_KEY]);

        let entries = names
            .filter_map(|name| {
                let values: Vec<f64> = fit
                    .coefficients
                    .iter()
                    .filter_map(|c| c.get(name))
                    .filter(|v| v.is_finite())
                    .collect();
                let (mean, std_dev) = mean_std(&values)?;
                Some(SummaryEntry {
                    name: name.to_string(),
                    mean,
                    std_dev,
                    t_stat: mean / std_dev * sqrt_n,
                    count: values.len(),
                })
            })
            .collect();

        CoefficientSummary { entries, periods }
    }
}

/// Mean and sample standard deviation; the deviation is NaN for one value.
fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        f64::NAN
    };
    Some((mean, std_dev))
}
