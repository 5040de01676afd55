//! Prospect theory value function.

/// Power value function with loss aversion.
///
/// Gains map to `|r|^alpha`, losses to `-lambda * |r|^alpha`. Missing and NaN
/// returns are treated as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueTransform {
    alpha: f64,
    lambda: f64,
}

impl ValueTransform {
    /// Create a value function with curvature `alpha` and loss aversion `lambda`.
    pub const fn new(alpha: f64, lambda: f64) -> Self {
        Self { alpha, lambda }
    }

    /// Value of a single return.
    pub fn value(&self, ret: f64) -> f64 {
        let ret = if ret.is_nan() { 0.0 } else { ret };
        let magnitude = ret.abs().powf(self.alpha);
        if ret < 0.0 {
            -self.lambda * magnitude
        } else {
            magnitude
        }
    }

    /// Values of a return series; `None` is treated as zero.
    pub fn apply(&self, returns: &[Option<f64>]) -> Vec<f64> {
        returns
            .iter()
            .map(|r| self.value(r.unwrap_or(0.0)))
            .collect()
    }
}

impl Default for ValueTransform {
    fn default() -> Self {
        Self::new(0.88, 2.25)
    }
}
