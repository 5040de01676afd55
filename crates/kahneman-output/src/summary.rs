//! One result row per experiment.

use kahneman_portfolio::{CarhartFit, PortfolioPerformance};
use serde::{Deserialize, Serialize};

/// Decimal places kept in result rows.
pub const DECIMALS: i32 = 4;

/// Portfolio performance on both splits of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitPerformance {
    /// Training split
    pub train: PortfolioPerformance,
    /// Validation split
    pub valid: PortfolioPerformance,
}

/// Result row of one experiment configuration.
///
/// `m` columns are mean simple returns in percent, `s` columns Sharpe ratios;
/// `L`, `S` and `LS` are the long, short and long-short portfolios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    /// Configuration name
    pub name: String,
    /// Number of features entering the score
    pub significant_vars: usize,
    /// Training long mean
    #[serde(rename = "train_m_L")]
    pub train_m_l: f64,
    /// Training short mean
    #[serde(rename = "train_m_S")]
    pub train_m_s: f64,
    /// Training long-short mean
    #[serde(rename = "train_m_LS")]
    pub train_m_ls: f64,
    /// Validation long mean
    #[serde(rename = "valid_m_L")]
    pub valid_m_l: f64,
    /// Validation short mean
    #[serde(rename = "valid_m_S")]
    pub valid_m_s: f64,
    /// Validation long-short mean
    #[serde(rename = "valid_m_LS")]
    pub valid_m_ls: f64,
    /// Training long Sharpe
    #[serde(rename = "train_s_L")]
    pub train_s_l: f64,
    /// Training short Sharpe
    #[serde(rename = "train_s_S")]
    pub train_s_s: f64,
    /// Training long-short Sharpe
    #[serde(rename = "train_s_LS")]
    pub train_s_ls: f64,
    /// Validation long Sharpe
    #[serde(rename = "valid_s_L")]
    pub valid_s_l: f64,
    /// Validation short Sharpe
    #[serde(rename = "valid_s_S")]
    pub valid_s_s: f64,
    /// Validation long-short Sharpe
    #[serde(rename = "valid_s_LS")]
    pub valid_s_ls: f64,
    /// Carhart R² on the training split
    pub train_rsq: f64,
    /// Carhart R² on the validation split
    pub valid_rsq: f64,
    /// Carhart alpha on the training split
    pub train_alpha: f64,
    /// Carhart alpha on the validation split
    pub valid_alpha: f64,
    /// p-value of the training alpha
    pub train_pval: f64,
    /// p-value of the validation alpha
    pub valid_pval: f64,
}

impl ExperimentSummary {
    /// Build a rounded row. Missing Carhart fits are reported as NaN.
    pub fn new(
        name: impl Into<String>,
        significant_vars: usize,
        performance: &SplitPerformance,
    ) -> Self {
        let SplitPerformance { train, valid } = performance;
        let carhart = |fit: &Option<CarhartFit>| {
            fit.map_or((f64::NAN, f64::NAN, f64::NAN), |c| {
                (c.r_squared, c.alpha, c.alpha_p_value)
            })
        };
        let (train_rsq, train_alpha, train_pval) = carhart(&train.carhart);
        let (valid_rsq, valid_alpha, valid_pval) = carhart(&valid.carhart);

        Self {
            name: name.into(),
            significant_vars,
            train_m_l: round(train.long.mean),
            train_m_s: round(train.short.mean),
            train_m_ls: round(train.spread.mean),
            valid_m_l: round(valid.long.mean),
            valid_m_s: round(valid.short.mean),
            valid_m_ls: round(valid.spread.mean),
            train_s_l: round(train.long.sharpe),
            train_s_s: round(train.short.sharpe),
            train_s_ls: round(train.spread.sharpe),
            valid_s_l: round(valid.long.sharpe),
            valid_s_s: round(valid.short.sharpe),
            valid_s_ls: round(valid.spread.sharpe),
            train_rsq: round(train_rsq),
            valid_rsq: round(valid_rsq),
            train_alpha: round(train_alpha),
            valid_alpha: round(valid_alpha),
            train_pval: round(train_pval),
            valid_pval: round(valid_pval),
        }
    }
}

/// Round half away from zero to [`DECIMALS`] places; NaN stays NaN.
pub fn round(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    (value * scale).round() / scale
}
