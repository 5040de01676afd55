//! Ordinary least squares.
//!
//! Solves the normal equations `(X'X) b = X'y` by Gauss-Jordan elimination
//! with partial pivoting. Adequate for the handful of regressors used here;
//! not intended for wide or badly conditioned designs.

use crate::error::RegressionError;
use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Pivots smaller than this fraction of the largest diagonal entry are
/// treated as zero.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Result of an OLS fit
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per column of the design
    pub params: Array1<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Array1<f64>,
    /// t-statistics of the coefficients
    pub t_values: Array1<f64>,
    /// Two-sided p-values of the coefficients
    pub p_values: Array1<f64>,
    /// Residuals `y - X b`
    pub residuals: Array1<f64>,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Number of observations
    pub nobs: usize,
    /// Residual degrees of freedom
    pub df_resid: usize,
}

/// Fit `y = X b + e` by least squares.
///
/// `centered` selects the total sum of squares used for R²: around the mean
/// of `y` (models with an intercept, or demeaned data) or around zero.
///
/// # Arguments
/// * `x` - Design matrix (N x K), including a constant column if wanted
/// * `y` - Response (N)
pub fn ols(x: &Array2<f64>, y: &Array1<f64>, centered: bool) -> Result<OlsFit, RegressionError> {
    let (n, k) = x.dim();
    if y.len() != n {
        return Err(RegressionError::DimensionMismatch {
            expected: n,
            actual: y.len(),
        });
    }
    if n <= k {
        return Err(RegressionError::InsufficientObservations {
            observations: n,
            parameters: k,
        });
    }

    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let xtx_inv = invert(&xtx)?;
    let params = xtx_inv.dot(&xty);

    let residuals = y - &x.dot(&params);
    let ssr = residuals.dot(&residuals);
    let tss = if centered {
        let mean = y.mean().unwrap_or(0.0);
        y.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
    } else {
        y.dot(y)
    };
    let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN };

    let df_resid = n - k;
    let sigma2 = ssr / df_resid as f64;
    let std_errors = xtx_inv.diag().mapv(|v| (v * sigma2).sqrt());
    let t_values = &params / &std_errors;
    let p_values = match StudentsT::new(0.0, 1.0, df_resid as f64) {
        Ok(dist) => t_values.mapv(|t| 2.0 * dist.sf(t.abs())),
        Err(_) => Array1::from_elem(k, f64::NAN),
    };

    Ok(OlsFit {
        params,
        std_errors,
        t_values,
        p_values,
        residuals,
        r_squared,
        nobs: n,
        df_resid,
    })
}

/// Invert a square matrix by Gauss-Jordan elimination.
pub(crate) fn invert(matrix: &Array2<f64>) -> Result<Array2<f64>, RegressionError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(RegressionError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }

    let scale = matrix
        .diag()
        .iter()
        .fold(0.0_f64, |m, v| m.max(v.abs()))
        .max(f64::MIN_POSITIVE);
    let mut a = matrix.clone();
    let mut inv = Array2::<f64>::eye(n);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot_row, col]].abs() <= SINGULAR_TOLERANCE * scale {
            return Err(RegressionError::Singular);
        }
        if pivot_row != col {
            for j in 0..n {
                a.swap([col, j], [pivot_row, j]);
                inv.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = a[[col, col]];
        for j in 0..n {
            a[[col, j]] /= pivot;
            inv[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[[row, j]] -= factor * a[[col, j]];
                inv[[row, j]] -= factor * inv[[col, j]];
            }
        }
    }

    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_exact_fit() {
        // y = 1 + 2x
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];
        let fit = ols(&x, &y, true).unwrap();
        assert_relative_eq!(fit.params[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.params[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-10);
        assert_eq!(fit.df_resid, 2);
    }

    #[test]
    fn test_noisy_fit_statistics() {
        let x = array![
            [1.0, 1.0],
            [1.0, 2.0],
            [1.0, 3.0],
            [1.0, 4.0],
            [1.0, 5.0]
        ];
        let y = array![2.1, 3.9, 6.2, 7.8, 10.1];
        let fit = ols(&x, &y, true).unwrap();

        // Hand-computed: slope 1.99, intercept 0.05
        assert_relative_eq!(fit.params[1], 1.99, epsilon = 1e-10);
        assert_relative_eq!(fit.params[0], 0.05, epsilon = 1e-10);
        assert!(fit.r_squared > 0.99);
        assert!(fit.p_values[1] < 0.001);
        assert!(fit.p_values[0] > 0.5);
        assert_relative_eq!(fit.residuals.sum(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_singular_design() {
        let x = array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(ols(&x, &y, true), Err(RegressionError::Singular)));
    }

    #[test]
    fn test_insufficient_observations() {
        let x = array![[1.0, 0.0], [1.0, 1.0]];
        let y = array![1.0, 2.0];
        assert!(matches!(
            ols(&x, &y, true),
            Err(RegressionError::InsufficientObservations { .. })
        ));
    }

    #[test]
    fn test_invert() {
        let m = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = invert(&m).unwrap();
        let identity = m.dot(&inv);
        assert_relative_eq!(identity[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(identity[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(identity[[1, 0]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(identity[[1, 1]], 1.0, epsilon = 1e-12);
    }
}
