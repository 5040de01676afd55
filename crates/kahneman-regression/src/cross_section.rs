//! Cross-sectional regression
//!
//! First pass of Fama-MacBeth: for each period, regress the target on the
//! features with industry effects absorbed, and keep the coefficients and R².
//!
//! Model per period `t`:
//! y_i = c + x_i' b + a_ind(i) + e_i
//!
//! The industry effects `a` are removed by within-industry demeaning; the
//! constant is recovered on grand means as `c = mean(y) - mean(x)' b`.

use crate::absorb::{COLLINEARITY_TOLERANCE, GroupIndex, independent_columns};
use crate::error::RegressionError;
use crate::ols::ols;
use kahneman_data::{Field, Observation, Panel, Period};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coefficient key of the constant.
pub const CONST_KEY: &str = "const";

/// Coefficient key of the period R².
pub const RSQ_KEY: &str = "Rsq";

/// Fitted values for one period, keyed by feature name plus [`CONST_KEY`] and
/// [`RSQ_KEY`]. Features dropped as absorbed or collinear are absent, and so
/// is [`RSQ_KEY`] when the target has no within-industry variation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCoefficients {
    /// Period of the cross-section
    pub period: Period,
    /// Number of observations in the fit
    pub nobs: usize,
    /// Coefficient values
    pub values: BTreeMap<String, f64>,
}

impl PeriodCoefficients {
    /// Value for a key.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// Why a period produced no coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Not enough observations for the parameters and absorbed effects
    InsufficientObservations {
        /// Usable observations
        observations: usize,
        /// Parameters plus absorbed effects
        parameters: usize,
    },
    /// The design could not be inverted
    SingularDesign,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientObservations {
                observations,
                parameters,
            } => write!(
                f,
                "{observations} observations for {parameters} parameters"
            ),
            Self::SingularDesign => write!(f, "singular design"),
        }
    }
}

/// A period that could not be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPeriod {
    /// Period of the cross-section
    pub period: Period,
    /// Reason for skipping
    pub reason: SkipReason,
}

/// Outcome of fitting one period.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodFit {
    /// Coefficients were estimated
    Fitted(PeriodCoefficients),
    /// The period was skipped
    Skipped(SkippedPeriod),
}

/// Per-period coefficients of a whole panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrossSectionalFit {
    /// Feature names in regression order
    pub features: Vec<String>,
    /// Fitted periods in ascending order
    pub coefficients: Vec<PeriodCoefficients>,
    /// Periods that could not be fitted
    pub skipped: Vec<SkippedPeriod>,
}

impl CrossSectionalFit {
    /// Number of fitted periods.
    pub fn n_periods(&self) -> usize {
        self.coefficients.len()
    }

    /// Whether no period was fitted.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

/// Cross-sectional regressor with industry absorption
#[derive(Debug, Clone)]
pub struct CrossSectionalRegressor {
    target: String,
    features: Vec<String>,
}

impl CrossSectionalRegressor {
    /// Create a regressor of `target` on `features`.
    pub fn new(target: impl Into<String>, features: Vec<String>) -> Self {
        Self {
            target: target.into(),
            features,
        }
    }

    /// Target column name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Feature column names.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Fit every period of the panel.
    ///
    /// Each cross-section uses the observations with a target, every feature
    /// and an industry label. Periods that cannot be fitted are recorded in
    /// [`CrossSectionalFit::skipped`] and otherwise ignored.
    pub fn fit(&self, panel: &Panel) -> Result<CrossSectionalFit, RegressionError> {
        let target = panel.field(&self.target)?;
        let features = panel.fields(&self.features)?;

        let mut result = CrossSectionalFit {
            features: self.features.clone(),
            ..Default::default()
        };

        for (period, rows) in panel.cross_sections() {
            match self.fit_period(period, &rows, target, &features) {
                PeriodFit::Fitted(coefficients) => result.coefficients.push(coefficients),
                PeriodFit::Skipped(skipped) => {
                    tracing::debug!(
                        period = %skipped.period,
                        reason = %skipped.reason,
                        "skipped cross-section"
                    );
                    result.skipped.push(skipped);
                }
            }
        }

        tracing::info!(
            target = %self.target,
            fitted = result.coefficients.len(),
            skipped = result.skipped.len(),
            "cross-sectional regressions complete"
        );
        Ok(result)
    }

    /// Fit a single cross-section.
    pub fn fit_period(
        &self,
        period: Period,
        rows: &[&Observation],
        target: Field,
        features: &[Field],
    ) -> PeriodFit {
        let usable: Vec<(f64, Vec<f64>, &str)> = rows
            .iter()
            .filter_map(|obs| {
                let y = obs.get(target)?;
                let x = features
                    .iter()
                    .map(|&f| obs.get(f))
                    .collect::<Option<Vec<f64>>>()?;
                let industry = obs.industry.as_deref()?;
                Some((y, x, industry))
            })
            .collect();

        let skip = |reason| PeriodFit::Skipped(SkippedPeriod { period, reason });

        let nobs = usable.len();
        let k = features.len();
        if nobs == 0 {
            return skip(SkipReason::InsufficientObservations {
                observations: 0,
                parameters: k + 1,
            });
        }

        let y = Array1::from_iter(usable.iter().map(|(y, _, _)| *y));
        let mut x = Array2::<f64>::zeros((nobs, k));
        for (i, (_, row, _)) in usable.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                x[[i, j]] = *v;
            }
        }
        let labels: Vec<&str> = usable.iter().map(|(_, _, ind)| *ind).collect();
        let groups = GroupIndex::new(&labels);

        let y_mean = y.mean().unwrap_or(0.0);
        let x_mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(k));
        let y_within = groups.demean(y.view());
        let x_within = groups.demean_columns(&x);

        let kept = independent_columns(&x_within, COLLINEARITY_TOLERANCE);
        let parameters = groups.n_groups() - 1 + kept.len() + 1;
        if nobs <= parameters {
            return skip(SkipReason::InsufficientObservations {
                observations: nobs,
                parameters,
            });
        }

        // A target flat within every industry fits with zero slopes and an
        // undefined R².
        let tss = y_within.dot(&y_within);
        let degenerate = !(tss.is_finite() && tss > f64::EPSILON * (1.0 + y.dot(&y)));

        let (betas, ssr) = if degenerate || kept.is_empty() {
            (Array1::zeros(kept.len()), tss)
        } else {
            let design = x_within.select(Axis(1), &kept);
            match ols(&design, &y_within, false) {
                Ok(fit) => {
                    let ssr = fit.residuals.dot(&fit.residuals);
                    (fit.params, ssr)
                }
                Err(RegressionError::Singular) => return skip(SkipReason::SingularDesign),
                Err(_) => {
                    return skip(SkipReason::InsufficientObservations {
                        observations: nobs,
                        parameters,
                    });
                }
            }
        };

        let mut values = BTreeMap::new();
        let mut constant = y_mean;
        for (beta, &j) in betas.iter().zip(&kept) {
            constant -= x_mean[j] * beta;
            values.insert(self.features[j].clone(), *beta);
        }
        values.insert(CONST_KEY.to_string(), constant);
        if !degenerate {
            values.insert(RSQ_KEY.to_string(), 1.0 - ssr / tss);
        }

        PeriodFit::Fitted(PeriodCoefficients {
            period,
            nobs,
            values,
        })
    }
}
