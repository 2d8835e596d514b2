//! Binary logistic regression with L2 penalty and balanced class weights.
//!
//! Minimizes
//!
//! ```text
//! 0.5 * ||w||² + C * Σ s_i * [ log(1 + e^{z_i}) - y_i * z_i ],   z_i = w·x_i + b
//! ```
//!
//! where `s_i` is the weight of sample `i`'s class and the intercept `b`
//! is not penalized. The objective is strictly convex in `w`, so damped
//! Newton steps converge in a handful of iterations on small feature
//! counts; the iteration cap only matters on degenerate data.

use ndarray::{s, Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticConfig {
    /// Inverse regularization strength.
    pub c: f64,
    /// Newton iteration cap.
    pub max_iter: usize,
    /// Stop when every gradient component is at most this in magnitude.
    pub tol: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 500,
            tol: 1e-4,
        }
    }
}

/// Fitted classifier parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Weight applied to class 0 and class 1 samples during fitting.
    pub class_weights: [f64; 2],
    pub c: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("training labels contain a single class ({0}); both 0 and 1 are required")]
    SingleClass(u8),

    #[error("label {0} is not binary")]
    NonBinaryLabel(u8),
}

/// Weights `n / (2 * n_c)` so each class contributes equally.
pub fn balanced_class_weights(labels: &Array1<u8>) -> Result<[f64; 2], FitError> {
    let mut counts = [0usize; 2];
    for &label in labels {
        match label {
            0 | 1 => counts[label as usize] += 1,
            other => return Err(FitError::NonBinaryLabel(other)),
        }
    }
    if counts[0] == 0 {
        return Err(FitError::SingleClass(1));
    }
    if counts[1] == 0 {
        return Err(FitError::SingleClass(0));
    }
    let n = labels.len() as f64;
    Ok([
        n / (2.0 * counts[0] as f64),
        n / (2.0 * counts[1] as f64),
    ])
}

impl LogisticRegression {
    /// Fit on `x` (rows are samples) against binary `y`.
    ///
    /// Running out of iterations is not an error: the last iterate is
    /// kept and `converged` is false.
    pub fn fit(x: &Array2<f64>, y: &Array1<u8>, config: &LogisticConfig) -> Result<Self, FitError> {
        if x.nrows() != y.len() {
            return Err(FitError::LengthMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }
        let class_weights = balanced_class_weights(y)?;
        let targets: Array1<f64> = y.mapv(f64::from);
        let sample_weights: Array1<f64> = y.mapv(|label| class_weights[label as usize]);

        let objective = Objective {
            x,
            y: &targets,
            s: &sample_weights,
            c: config.c,
        };

        let dim = x.ncols() + 1;
        let mut theta = Array1::<f64>::zeros(dim);
        let mut loss = objective.loss(&theta);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < config.max_iter {
            let (gradient, hessian) = objective.gradient_and_hessian(&theta);
            let max_grad = gradient.iter().fold(0.0_f64, |acc, g| acc.max(g.abs()));
            if max_grad <= config.tol {
                converged = true;
                break;
            }
            iterations += 1;

            let direction = solve(hessian, gradient.clone()).unwrap_or_else(|| gradient.clone());
            let slope = gradient.dot(&direction);

            // Backtracking (Armijo) on the Newton direction.
            let mut step = 1.0;
            let mut accepted = false;
            for _ in 0..40 {
                let candidate = &theta - &(&direction * step);
                let candidate_loss = objective.loss(&candidate);
                if candidate_loss <= loss - 1e-4 * step * slope {
                    theta = candidate;
                    loss = candidate_loss;
                    accepted = true;
                    break;
                }
                step *= 0.5;
            }
            if !accepted {
                debug!(iterations, max_grad, "Line search stalled");
                break;
            }
        }

        if !converged {
            let (gradient, _) = objective.gradient_and_hessian(&theta);
            converged = gradient.iter().all(|g| g.abs() <= config.tol);
        }
        if !converged {
            warn!(
                iterations,
                max_iter = config.max_iter,
                "Logistic regression did not converge; keeping best-effort parameters"
            );
        }

        let n = x.ncols();
        Ok(Self {
            coefficients: theta.slice(s![..n]).to_vec(),
            intercept: theta[n],
            class_weights,
            c: config.c,
            iterations,
            converged,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Raw margin `w·x + b` for an already standardized sample.
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept
    }

    /// Probability of the positive class for an already standardized sample.
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        sigmoid(self.decision_function(x))
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

// ---------------------------------------------------------------------------
// Objective
// ---------------------------------------------------------------------------

/// Penalized weighted log-loss over `theta = [w..., b]`.
struct Objective<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    s: &'a Array1<f64>,
    c: f64,
}

impl Objective<'_> {
    fn margin(&self, theta: &Array1<f64>, row: ArrayView1<f64>) -> f64 {
        let n = row.len();
        row.iter().zip(theta.iter().take(n)).map(|(v, w)| v * w).sum::<f64>() + theta[n]
    }

    fn loss(&self, theta: &Array1<f64>) -> f64 {
        let n = self.x.ncols();
        let penalty = 0.5 * theta.iter().take(n).map(|w| w * w).sum::<f64>();
        let data: f64 = self
            .x
            .rows()
            .into_iter()
            .zip(self.y.iter().zip(self.s.iter()))
            .map(|(row, (&y, &s))| {
                let z = self.margin(theta, row);
                s * (softplus(z) - y * z)
            })
            .sum();
        penalty + self.c * data
    }

    fn gradient_and_hessian(&self, theta: &Array1<f64>) -> (Array1<f64>, Array2<f64>) {
        let n = self.x.ncols();
        let dim = n + 1;
        let mut gradient = Array1::<f64>::zeros(dim);
        let mut hessian = Array2::<f64>::zeros((dim, dim));

        for j in 0..n {
            gradient[j] = theta[j];
            hessian[[j, j]] = 1.0;
        }

        let mut augmented = vec![1.0; dim];
        for (row, (&y, &s)) in self.x.rows().into_iter().zip(self.y.iter().zip(self.s.iter())) {
            let p = sigmoid(self.margin(theta, row));
            for (slot, &v) in augmented.iter_mut().zip(row.iter()) {
                *slot = v;
            }
            let residual = self.c * s * (p - y);
            let curvature = self.c * s * p * (1.0 - p);
            for a in 0..dim {
                gradient[a] += residual * augmented[a];
                for b in 0..dim {
                    hessian[[a, b]] += curvature * augmented[a] * augmented[b];
                }
            }
        }

        (gradient, hessian)
    }
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
/// Returns `None` for a (numerically) singular system.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
