//! Per-feature standardization to zero mean and unit variance.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted standardization statistics.
///
/// Variance is the population variance of the training column. Columns
/// with zero variance keep a scale of 1.0 so they pass through centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Compute column statistics from `x` (rows are samples).
    pub fn fit(x: &Array2<f64>) -> Self {
        let n = x.nrows().max(1) as f64;
        let mean: Vec<f64> = x
            .mean_axis(Axis(0))
            .map(|m| m.to_vec())
            .unwrap_or_else(|| vec![0.0; x.ncols()]);

        let variance: Vec<f64> = x
            .axis_iter(Axis(1))
            .zip(&mean)
            .map(|(col, &mu)| col.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n)
            .collect();

        let scale = variance
            .iter()
            .map(|&var| if var > 0.0 { var.sqrt() } else { 1.0 })
            .collect();

        Self {
            mean,
            variance,
            scale,
        }
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize every row of `x`.
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for mut row in out.rows_mut() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (*v - self.mean[j]) / self.scale[j];
            }
        }
        out
    }

    /// Standardize a single sample.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (mu, s))| (v - mu) / s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_statistics() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = StandardScaler::fit(&x);
        assert_eq!(scaler.mean, vec![3.0, 10.0]);
        assert!((scaler.variance[0] - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(scaler.variance[1], 0.0);
        assert_eq!(scaler.scale[1], 1.0);
    }

    #[test]
    fn test_transformed_columns_are_standardized() {
        let x = array![[1.0, 200.0], [2.0, 180.0], [4.0, 260.0], [9.0, 90.0]];
        let scaler = StandardScaler::fit(&x);
        let z = scaler.transform(&x);

        for col in z.axis_iter(Axis(1)) {
            let mean = col.sum() / col.len() as f64;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len() as f64;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_transform_row_matches_matrix_transform() {
        let x = array![[1.0, 200.0], [2.0, 180.0], [4.0, 260.0]];
        let scaler = StandardScaler::fit(&x);
        let z = scaler.transform(&x);
        let row = scaler.transform_row(&[2.0, 180.0]);
        assert!((row[0] - z[[1, 0]]).abs() < 1e-12);
        assert!((row[1] - z[[1, 1]]).abs() < 1e-12);
    }
}
