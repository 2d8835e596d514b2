//! Fitted scoring pipeline: standardization followed by logistic regression.
//!
//! A `TrainedModel` is immutable once fitted. The scorer never inspects
//! what a model "can do"; it asks for a `Prediction`, which is one of
//! exactly two shapes, and normalizes that.

pub mod logistic;
pub mod scaler;
pub mod train;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{FeatureVector, FEATURE_COUNT};
use logistic::LogisticRegression;
use scaler::StandardScaler;

pub use train::{train_model, TrainConfig, TrainError};

// ---------------------------------------------------------------------------
// Model output
// ---------------------------------------------------------------------------

/// Which output a model exposes to the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Per-class probabilities.
    #[default]
    Probability,
    /// Unbounded margin only.
    DecisionScore,
}

/// Raw model output for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    ClassProbabilities { negative: f64, positive: f64 },
    DecisionScore(f64),
}

// ---------------------------------------------------------------------------
// Trained model
// ---------------------------------------------------------------------------

/// Provenance of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub samples: usize,
    pub seed: u64,
    pub positives: usize,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
    #[serde(default)]
    pub output_mode: OutputMode,
    pub training: TrainingSummary,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("{component} expects {found} features, pipeline requires {}", FEATURE_COUNT)]
    Dimension { component: &'static str, found: usize },

    #[error("{0} contains non-finite parameters")]
    NonFinite(&'static str),
}

impl TrainedModel {
    /// Serve margins instead of probabilities.
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Check that the parameters fit the 5-feature schema.
    pub fn validate(&self) -> Result<(), ModelError> {
        let scaler_dims = [
            self.scaler.mean.len(),
            self.scaler.variance.len(),
            self.scaler.scale.len(),
        ];
        if let Some(&found) = scaler_dims.iter().find(|&&d| d != FEATURE_COUNT) {
            return Err(ModelError::Dimension { component: "scaler", found });
        }
        if self.classifier.n_features() != FEATURE_COUNT {
            return Err(ModelError::Dimension {
                component: "classifier",
                found: self.classifier.n_features(),
            });
        }
        let scaler_finite = self
            .scaler
            .mean
            .iter()
            .chain(&self.scaler.scale)
            .all(|v| v.is_finite())
            && self.scaler.scale.iter().all(|&s| s > 0.0);
        if !scaler_finite {
            return Err(ModelError::NonFinite("scaler"));
        }
        let classifier_finite = self
            .classifier
            .coefficients
            .iter()
            .all(|v| v.is_finite())
            && self.classifier.intercept.is_finite();
        if !classifier_finite {
            return Err(ModelError::NonFinite("classifier"));
        }
        Ok(())
    }

    /// Margin of the standardized sample.
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        let z = self.scaler.transform_row(features.as_slice());
        self.classifier.decision_function(&z)
    }

    /// `[P(normal), P(anomalous)]`.
    pub fn predict_proba(&self, features: &FeatureVector) -> [f64; 2] {
        let z = self.scaler.transform_row(features.as_slice());
        let positive = self.classifier.predict_proba(&z);
        [1.0 - positive, positive]
    }

    /// Output in the shape selected by `output_mode`.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        match self.output_mode {
            OutputMode::Probability => {
                let [negative, positive] = self.predict_proba(features);
                Prediction::ClassProbabilities { negative, positive }
            }
            OutputMode::DecisionScore => Prediction::DecisionScore(self.decision_function(features)),
        }
    }
}

/// Hand-built model: anomalous when ratio or price is high.
#[cfg(test)]
pub(crate) fn fixed_model() -> TrainedModel {
    TrainedModel {
        scaler: StandardScaler {
            mean: vec![57.0, 2.55, 145.0, 95.0, 0.6],
            variance: vec![400.0, 0.0064, 2500.0, 400.0, 0.0225],
            scale: vec![20.0, 0.08, 50.0, 20.0, 0.15],
        },
        classifier: LogisticRegression {
            coefficients: vec![0.2, 2.0, 0.3, -0.1, 3.0],
            intercept: -2.0,
            class_weights: [0.55, 5.5],
            c: 1.0,
            iterations: 12,
            converged: true,
        },
        output_mode: OutputMode::Probability,
        training: TrainingSummary {
            samples: 600,
            seed: 42,
            positives: 60,
            trained_at: Utc::now(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
