//! One-way effect absorption.
//!
//! Industry effects are absorbed by the within transformation: every column
//! is demeaned inside its group. Regressors left without variation (fully
//! absorbed) or spanned by earlier regressors are dropped before fitting.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::collections::HashMap;

/// Residual norms below this fraction of a column's original norm mark it
/// as absorbed or collinear.
pub const COLLINEARITY_TOLERANCE: f64 = 1e-8;

/// Dense group codes for a sequence of labels.
#[derive(Debug, Clone)]
pub struct GroupIndex {
    codes: Vec<usize>,
    sizes: Vec<usize>,
}

impl GroupIndex {
    /// Assign codes in order of first appearance.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut lookup: HashMap<&str, usize> = HashMap::new();
        let mut codes = Vec::with_capacity(labels.len());
        let mut sizes = Vec::new();
        for label in labels {
            let next = lookup.len();
            let code = *lookup.entry(label.as_ref()).or_insert(next);
            if code == sizes.len() {
                sizes.push(0);
            }
            sizes[code] += 1;
            codes.push(code);
        }
        Self { codes, sizes }
    }

    /// Number of distinct groups.
    pub fn n_groups(&self) -> usize {
        self.sizes.len()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether there are no observations.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Subtract group means from a vector.
    pub fn demean(&self, values: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut sums = vec![0.0; self.n_groups()];
        for (&code, &v) in self.codes.iter().zip(values.iter()) {
            sums[code] += v;
        }
        let means: Vec<f64> = sums
            .iter()
            .zip(&self.sizes)
            .map(|(s, &n)| s / n as f64)
            .collect();
        values
            .iter()
            .zip(&self.codes)
            .map(|(v, &code)| v - means[code])
            .collect()
    }

    /// Subtract group means from every column of a matrix.
    pub fn demean_columns(&self, matrix: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros(matrix.raw_dim());
        for (j, column) in matrix.axis_iter(Axis(1)).enumerate() {
            out.column_mut(j).assign(&self.demean(column));
        }
        out
    }
}

/// Indices of columns that are linearly independent of the columns before
/// them, by modified Gram-Schmidt.
///
/// A column whose norm is zero, or whose residual after projecting out the
/// kept columns is below `tolerance` times its norm, is dropped.
pub fn independent_columns(matrix: &Array2<f64>, tolerance: f64) -> Vec<usize> {
    let mut basis: Vec<Array1<f64>> = Vec::new();
    let mut kept = Vec::new();

    for (j, column) in matrix.axis_iter(Axis(1)).enumerate() {
        let norm = column.dot(&column).sqrt();
        if !(norm.is_finite() && norm > 0.0) {
            continue;
        }
        let mut residual = column.to_owned();
        for q in &basis {
            let projection = q.dot(&residual);
            residual.scaled_add(-projection, q);
        }
        let residual_norm = residual.dot(&residual).sqrt();
        if residual_norm > tolerance * norm {
            basis.push(residual / residual_norm);
            kept.push(j);
        }
    }

    kept
}
