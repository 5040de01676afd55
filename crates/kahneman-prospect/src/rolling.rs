//! Rolling TK engine.
//!
//! For each trailing window of `window` transformed returns the engine counts
//! losses `m` (negative values) and gains `n` (the rest), fetches the decision
//! weights for `(m, n)` and takes their dot product with the window in
//! chronological order.

use crate::cache::WeightCache;
use crate::config::ProspectConfig;
use crate::error::ProspectError;
use crate::value::ValueTransform;
use crate::weighting::ProbabilityWeighting;

/// Computes rolling TK scores for one security history at a time.
///
/// Owns its [`WeightCache`]; use one engine per thread.
#[derive(Debug)]
pub struct RollingTKEngine {
    value: ValueTransform,
    cache: WeightCache,
    window: usize,
}

impl RollingTKEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: &ProspectConfig) -> Result<Self, ProspectError> {
        config.validate()?;
        Ok(Self {
            value: ValueTransform::new(config.alpha, config.lambda),
            cache: WeightCache::new(
                ProbabilityWeighting::new(config.gamma, config.theta),
                config.cache_capacity,
            ),
            window: config.window,
        })
    }

    /// Trailing window length.
    pub const fn window(&self) -> usize {
        self.window
    }

    /// The value function applied before weighting.
    pub const fn value_transform(&self) -> &ValueTransform {
        &self.value
    }

    /// The engine's weight cache.
    pub const fn cache(&self) -> &WeightCache {
        &self.cache
    }

    /// Drop cached weights, e.g. between independent runs.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// TK value of one window of transformed returns.
    ///
    /// NaN values count as zero. The window is not sorted.
    pub fn compute_tk(&mut self, values: &[f64]) -> f64 {
        let losses = values.iter().filter(|&&v| v < 0.0).count();
        let gains = values.len() - losses;
        let weights = self.cache.get(losses, gains);
        weights
            .iter()
            .zip(values)
            .map(|(w, v)| if v.is_nan() { 0.0 } else { w * v })
            .sum()
    }

    /// TK scores over already transformed values, one per period.
    ///
    /// Positions before the first full window, and every position of a
    /// history shorter than the window, score zero.
    pub fn scores_from_values(&mut self, values: &[f64]) -> Vec<f64> {
        let mut scores = vec![0.0; values.len()];
        if values.len() < self.window {
            return scores;
        }
        for end in self.window..=values.len() {
            let tk = self.compute_tk(&values[end - self.window..end]);
            scores[end - 1] = if tk.is_nan() { 0.0 } else { tk };
        }
        scores
    }

    /// Transform raw returns and compute TK scores for one security,
    /// ordered by period.
    pub fn scores(&mut self, returns: &[Option<f64>]) -> Vec<f64> {
        let values = self.value.apply(returns);
        self.scores_from_values(&values)
    }
}
