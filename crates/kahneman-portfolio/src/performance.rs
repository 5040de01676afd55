//! Portfolio performance
//!
//! Summary statistics of the long, short and spread series, and the Carhart
//! four-factor regression of the spread:
//!
//! spread_t = alpha + b1 mkt_rf_t + b2 SMB_t + b3 HML_t + b4 Mom_t + e_t

use crate::builder::PortfolioReturn;
use crate::error::PortfolioError;
use kahneman_data::BenchmarkFactors;
use kahneman_regression::ols;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Mean, standard deviation and Sharpe ratio of simple percentage returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegStats {
    /// Mean simple return in percent
    pub mean: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// `mean / std_dev`, not annualized
    pub sharpe: f64,
    /// Periods with a return
    pub count: usize,
}

impl LegStats {
    /// Statistics of log percentage returns, skipping missing periods.
    pub fn from_log_returns(returns: impl IntoIterator<Item = Option<f64>>) -> Self {
        let simple: Vec<f64> = returns
            .into_iter()
            .flatten()
            .filter(|r| r.is_finite())
            .map(|r| 100.0 * (r / 100.0).exp_m1())
            .collect();

        let count = simple.len();
        let mean = if count > 0 {
            simple.iter().sum::<f64>() / count as f64
        } else {
            f64::NAN
        };
        let std_dev = if count > 1 {
            (simple.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Self {
            mean,
            std_dev,
            sharpe: mean / std_dev,
            count,
        }
    }
}

/// Carhart regression of the spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarhartFit {
    /// R² of the regression
    pub r_squared: f64,
    /// Intercept in percent per period
    pub alpha: f64,
    /// Two-sided p-value of the intercept
    pub alpha_p_value: f64,
    /// Periods used
    pub nobs: usize,
}

/// Everything reported for one portfolio series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// Long leg
    pub long: LegStats,
    /// Short leg
    pub short: LegStats,
    /// Long minus short
    pub spread: LegStats,
    /// Four-factor fit, if it could be estimated
    pub carhart: Option<CarhartFit>,
}

/// Evaluates portfolio series against benchmark factors.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceEvaluator<'a> {
    factors: &'a BenchmarkFactors,
}

impl<'a> PerformanceEvaluator<'a> {
    /// Create an evaluator over a benchmark factor table.
    pub const fn new(factors: &'a BenchmarkFactors) -> Self {
        Self { factors }
    }

    /// Leg statistics and Carhart fit of a portfolio series.
    ///
    /// A Carhart regression that cannot be estimated is logged and reported
    /// as `None`.
    pub fn evaluate(&self, returns: &[PortfolioReturn]) -> PortfolioPerformance {
        let carhart = match self.carhart(returns) {
            Ok(fit) => Some(fit),
            Err(err) => {
                tracing::warn!(periods = returns.len(), %err, "carhart regression failed");
                None
            }
        };

        PortfolioPerformance {
            long: LegStats::from_log_returns(returns.iter().map(|r| r.long)),
            short: LegStats::from_log_returns(returns.iter().map(|r| r.short)),
            spread: LegStats::from_log_returns(returns.iter().map(|r| r.spread)),
            carhart,
        }
    }

    /// Regress the spread on the four factors of the matching month.
    ///
    /// Periods are matched on their first calendar day; periods without a
    /// spread or a complete factor row are dropped.
    pub fn carhart(&self, returns: &[PortfolioReturn]) -> Result<CarhartFit, PortfolioError> {
        let rows: Vec<(f64, [f64; 4])> = returns
            .iter()
            .filter_map(|r| {
                let spread = r.spread.filter(|s| s.is_finite())?;
                let factors = self.factors.for_period(r.period)?.complete()?;
                Some((spread, factors))
            })
            .collect();

        let n = rows.len();
        let mut x = Array2::<f64>::ones((n, 5));
        let mut y = Array1::<f64>::zeros(n);
        for (i, (spread, factors)) in rows.iter().enumerate() {
            y[i] = *spread;
            for (j, f) in factors.iter().enumerate() {
                x[[i, j + 1]] = *f;
            }
        }

        let fit = ols(&x, &y, true)?;
        Ok(CarhartFit {
            r_squared: fit.r_squared,
            alpha: fit.params[0],
            alpha_p_value: fit.p_values[0],
            nobs: fit.nobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kahneman_data::{BenchmarkRow, Period};

    fn factor_row(t: usize) -> BenchmarkRow {
        let t = t as f64;
        BenchmarkRow {
            market: Some((t * 0.7).sin()),
            size: Some((t * 1.3).cos()),
            value: Some((t * 0.4).sin() * 0.5),
            momentum: Some(((t * 2.1).cos() - 0.2) * 0.8),
        }
    }

    fn setup(n: usize, alpha: f64) -> (BenchmarkFactors, Vec<PortfolioReturn>) {
        let mut period = Period::from_yyyymm(200001).unwrap();
        let mut dates = Vec::new();
        let mut returns = Vec::new();
        for t in 0..n {
            let row = factor_row(t);
            let [m, s, v, mo] = row.complete().unwrap();
            let spread = alpha + 1.2 * m - 0.3 * s + 0.5 * v + 0.1 * mo;
            dates.push((period.first_day().unwrap(), row));
            returns.push(PortfolioReturn {
                period,
                long: Some(spread),
                short: Some(0.0),
                spread: Some(spread),
            });
            period = period.next();
        }
        (BenchmarkFactors::new(dates), returns)
    }

    #[test]
    fn test_leg_stats() {
        let up = 100.0 * 1.02f64.ln();
        let down = 100.0 * 0.98f64.ln();
        let stats = LegStats::from_log_returns([Some(up), None, Some(down), Some(up)]);
        assert_eq!(stats.count, 3);
        assert_relative_eq!(stats.mean, 2.0 / 3.0, epsilon = 1e-10);
        let mean = 2.0 / 3.0f64;
        let expected_std = ((2.0 * (2.0 - mean).powi(2) + (-2.0 - mean).powi(2)) / 2.0).sqrt();
        assert_relative_eq!(stats.std_dev, expected_std, epsilon = 1e-10);
        assert_relative_eq!(stats.sharpe, stats.mean / stats.std_dev);
    }

    #[test]
    fn test_leg_stats_empty() {
        let stats = LegStats::from_log_returns([None, None]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.sharpe.is_nan());
    }

    #[test]
    fn test_carhart_recovers_alpha() {
        let (factors, returns) = setup(30, 0.75);
        let fit = PerformanceEvaluator::new(&factors).carhart(&returns).unwrap();
        assert_relative_eq!(fit.alpha, 0.75, epsilon = 1e-8);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-8);
        assert_eq!(fit.nobs, 30);
    }

    #[test]
    fn test_carhart_drops_unmatched_periods() {
        let (factors, mut returns) = setup(20, 0.5);
        let mut late = returns[0];
        late.period = Period::from_yyyymm(209912).unwrap();
        returns.push(late);
        returns[3].spread = None;

        let fit = PerformanceEvaluator::new(&factors).carhart(&returns).unwrap();
        assert_eq!(fit.nobs, 19);
    }

    #[test]
    fn test_too_few_periods() {
        let (factors, returns) = setup(4, 0.5);
        let evaluator = PerformanceEvaluator::new(&factors);
        assert!(evaluator.carhart(&returns).is_err());
        assert!(evaluator.evaluate(&returns).carhart.is_none());
    }
}
