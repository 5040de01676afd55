//! Long-short portfolio returns.

use crate::error::PortfolioError;
use crate::ranking::{RankedObservation, RankingConfig};
use kahneman_data::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Equal-weighted mean of log returns in percent.
///
/// Each return is converted to a simple return, averaged, and converted back:
/// `100 * ln(mean(exp(r / 100) - 1) + 1)`. Non-finite inputs are ignored;
/// `None` when nothing is left.
pub fn log_compounded_mean(returns: &[f64]) -> Option<f64> {
    let simple: Vec<f64> = returns
        .iter()
        .filter(|r| r.is_finite())
        .map(|r| (r / 100.0).exp_m1())
        .collect();
    if simple.is_empty() {
        return None;
    }
    let mean = simple.iter().sum::<f64>() / simple.len() as f64;
    Some(100.0 * mean.ln_1p())
}

/// Portfolio returns for one period, in log percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReturn {
    /// Holding period
    pub period: Period,
    /// Top-bucket return
    pub long: Option<f64>,
    /// Bottom-bucket return
    pub short: Option<f64>,
    /// `long - short`
    pub spread: Option<f64>,
}

/// Forms long and short legs from ranked observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortfolioBuilder {
    long_bucket: usize,
    short_bucket: usize,
}

impl Default for PortfolioBuilder {
    fn default() -> Self {
        Self {
            long_bucket: RankingConfig::default().top_bucket(),
            short_bucket: 0,
        }
    }
}

impl PortfolioBuilder {
    /// Long the top bucket and short the bottom bucket of `config`.
    pub fn from_config(config: &RankingConfig) -> Result<Self, PortfolioError> {
        config.validate()?;
        Ok(Self {
            long_bucket: config.top_bucket(),
            short_bucket: 0,
        })
    }

    /// Bucket held long.
    pub const fn long_bucket(&self) -> usize {
        self.long_bucket
    }

    /// Bucket held short.
    pub const fn short_bucket(&self) -> usize {
        self.short_bucket
    }

    /// Portfolio return of every period with at least one observation in the
    /// long or short bucket, in ascending period order.
    pub fn build(&self, ranked: &[RankedObservation]) -> Vec<PortfolioReturn> {
        let mut legs: BTreeMap<Period, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for obs in ranked {
            if obs.decile != self.long_bucket && obs.decile != self.short_bucket {
                continue;
            }
            let (long, short) = legs.entry(obs.period).or_default();
            let Some(ret) = obs.next_return else {
                continue;
            };
            if obs.decile == self.long_bucket {
                long.push(ret);
            } else {
                short.push(ret);
            }
        }

        legs.into_iter()
            .map(|(period, (long, short))| {
                let long = log_compounded_mean(&long);
                let short = log_compounded_mean(&short);
                if long.is_none() || short.is_none() {
                    tracing::warn!(
                        %period,
                        long = long.is_some(),
                        short = short.is_some(),
                        "empty portfolio leg"
                    );
                }
                PortfolioReturn {
                    period,
                    long,
                    short,
                    spread: long.zip(short).map(|(l, s)| l - s),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kahneman_data::SecurityId;

    fn ranked(security: i64, yyyymm: i64, decile: usize, ret: Option<f64>) -> RankedObservation {
        RankedObservation {
            security: SecurityId(security),
            period: Period::from_yyyymm(yyyymm).unwrap(),
            score: Some(0.0),
            decile,
            next_return: ret,
        }
    }

    #[test]
    fn test_single_return_is_identity() {
        assert_relative_eq!(log_compounded_mean(&[3.7]).unwrap(), 3.7, epsilon = 1e-12);
        assert_relative_eq!(log_compounded_mean(&[-12.0]).unwrap(), -12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_of_simple_returns() {
        // ln(1.1) and ln(0.9) in percent average to a 0% simple return.
        let up = 100.0 * 1.1f64.ln();
        let down = 100.0 * 0.9f64.ln();
        assert_relative_eq!(log_compounded_mean(&[up, down]).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_leg_is_none() {
        assert_eq!(log_compounded_mean(&[]), None);
        assert_eq!(log_compounded_mean(&[f64::NAN]), None);
    }

    #[test]
    fn test_build_legs_and_spread() {
        let rows = vec![
            ranked(1, 200102, 9, Some(2.0)),
            ranked(2, 200102, 0, Some(-1.0)),
            ranked(3, 200102, 5, Some(50.0)),
            ranked(1, 200101, 9, Some(4.0)),
            ranked(2, 200101, 9, Some(4.0)),
            ranked(3, 200101, 0, Some(1.0)),
        ];
        let out = PortfolioBuilder::default().build(&rows);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].period.yyyymm(), 200101);
        assert_relative_eq!(out[0].long.unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(out[0].spread.unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(out[1].spread.unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_one_sided_period_has_no_spread() {
        let rows = vec![
            ranked(1, 200101, 9, Some(2.0)),
            ranked(2, 200101, 0, None),
            ranked(3, 200101, 4, Some(1.0)),
            ranked(4, 200102, 4, Some(1.0)),
        ];
        let out = PortfolioBuilder::default().build(&rows);
        assert_eq!(out.len(), 1);
        assert!(out[0].long.is_some());
        assert_eq!(out[0].short, None);
        assert_eq!(out[0].spread, None);
    }

    #[test]
    fn test_from_config_buckets() {
        let config = RankingConfig {
            buckets: 5,
            ..Default::default()
        };
        let builder = PortfolioBuilder::from_config(&config).unwrap();
        assert_eq!(builder.long_bucket(), 4);
        assert_eq!(builder.short_bucket(), 0);
        assert_eq!(PortfolioBuilder::default().long_bucket(), 9);
    }

    #[test]
    fn test_from_config_rejects_zero_buckets() {
        let config = RankingConfig {
            buckets: 0,
            ..Default::default()
        };
        assert_eq!(config.top_bucket(), 0);
        assert!(matches!(
            PortfolioBuilder::from_config(&config),
            Err(PortfolioError::InvalidConfig(_))
        ));
    }
}
