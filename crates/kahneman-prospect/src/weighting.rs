//! Rank-dependent probability weighting.
//!
//! Decision weights for a window with `m` losses and `n` gains (`l = m + n`):
//!
//! - loss `i` (1..=m): `w(i/l, theta) - w((i-1)/l, theta)`
//! - gain `i` (1..=n): `w((n-i+1)/l, gamma) - w((n-i)/l, gamma)`
//!
//! where `w(p, f) = p^f / (p^f + (1-p)^f)^(1/f)`. Losses come first, matching
//! an ascending sort of the window.

/// Probability weighting function with separate gain and loss curvature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityWeighting {
    gamma: f64,
    theta: f64,
}

impl ProbabilityWeighting {
    /// Create a weighting with gain curvature `gamma` and loss curvature `theta`.
    pub const fn new(gamma: f64, theta: f64) -> Self {
        Self { gamma, theta }
    }

    /// Weighted probability `w(p, f)`.
    pub fn weight(p: f64, f: f64) -> f64 {
        let pf = p.powf(f);
        pf / (pf + (1.0 - p).powf(f)).powf(1.0 / f)
    }

    /// Decision weights for `losses` negative and `gains` non-negative outcomes.
    pub fn decision_weights(&self, losses: usize, gains: usize) -> Vec<f64> {
        let total = (losses + gains) as f64;
        let mut weights = Vec::with_capacity(losses + gains);

        for i in 1..=losses {
            weights.push(
                Self::weight(i as f64 / total, self.theta)
                    - Self::weight((i - 1) as f64 / total, self.theta),
            );
        }
        for i in 1..=gains {
            weights.push(
                Self::weight((gains - i + 1) as f64 / total, self.gamma)
                    - Self::weight((gains - i) as f64 / total, self.gamma),
            );
        }

        weights
    }

    /// Gain curvature.
    pub const fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Loss curvature.
    pub const fn theta(&self) -> f64 {
        self.theta
    }
}

impl Default for ProbabilityWeighting {
    fn default() -> Self {
        Self::new(0.61, 0.69)
    }
}
