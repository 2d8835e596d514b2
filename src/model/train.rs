//! Training pipeline: synthetic dataset → scaler → logistic regression.

use chrono::Utc;
use tracing::info;

use super::logistic::{FitError, LogisticConfig, LogisticRegression};
use super::scaler::StandardScaler;
use super::{OutputMode, TrainedModel, TrainingSummary};
use crate::dataset::{build_dataset, DatasetError, SyntheticDataset};

/// Training configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    /// Rows of synthetic data to generate.
    pub samples: usize,
    /// Seed for the dataset generator.
    pub seed: u64,
    pub logistic: LogisticConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            samples: 600,
            seed: 42,
            logistic: LogisticConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("dataset generation failed: {0}")]
    Dataset(#[from] DatasetError),

    #[error("classifier fit failed: {0}")]
    Fit(#[from] FitError),
}

/// Generate the synthetic dataset and fit the pipeline on it.
pub fn train_model(config: &TrainConfig) -> Result<TrainedModel, TrainError> {
    let dataset = build_dataset(config.samples, config.seed)?;
    let model = fit_pipeline(&dataset, config)?;

    info!(
        samples = config.samples,
        seed = config.seed,
        positives = model.training.positives,
        iterations = model.classifier.iterations,
        converged = model.classifier.converged,
        "Model trained"
    );

    Ok(model)
}

/// Fit scaler and classifier on an existing dataset.
pub fn fit_pipeline(dataset: &SyntheticDataset, config: &TrainConfig) -> Result<TrainedModel, TrainError> {
    let scaler = StandardScaler::fit(&dataset.features);
    let standardized = scaler.transform(&dataset.features);
    let classifier = LogisticRegression::fit(&standardized, &dataset.labels, &config.logistic)?;

    Ok(TrainedModel {
        scaler,
        classifier,
        output_mode: OutputMode::Probability,
        training: TrainingSummary {
            samples: dataset.len(),
            seed: config.seed,
            positives: dataset.positive_count(),
            trained_at: Utc::now(),
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FEATURE_NAMES;

    #[test]
    fn test_default_config() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.samples, 600);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.logistic.max_iter, 500);
        assert_eq!(cfg.logistic.c, 1.0);
    }

    #[test]
    fn test_train_is_deterministic() {
        let cfg = TrainConfig { seed: 1, ..TrainConfig::default() };
        let a = train_model(&cfg).unwrap();
        let b = train_model(&cfg).unwrap();
        assert_eq!(a.scaler, b.scaler);
        assert_eq!(a.classifier, b.classifier);
    }

    #[test]
    fn test_default_training_converges() {
        let model = train_model(&TrainConfig::default()).unwrap();
        assert!(model.classifier.converged);
        assert!(model.classifier.iterations <= 500);
        assert_eq!(model.training.samples, 600);
        assert!(model.validate().is_ok());
        // positives are the minority, so they carry the larger weight
        assert!(model.classifier.class_weights[1] > model.classifier.class_weights[0]);
    }

    #[test]
    fn test_price_pushes_risk_up() {
        let model = train_model(&TrainConfig::default()).unwrap();
        let price = FEATURE_NAMES.iter().position(|&n| n == "unit_price").unwrap();
        assert!(model.classifier.coefficients[price] > 0.0);

        let normal = crate::features::build_features(55.0, 2.55, 140.25, Some(95.0));
        let overfill = crate::features::build_features(150.0, 2.55, 382.5, Some(95.0));
        assert!(model.predict_proba(&overfill)[1] > model.predict_proba(&normal)[1]);
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let cfg = TrainConfig { samples: 0, ..TrainConfig::default() };
        assert!(matches!(train_model(&cfg), Err(TrainError::Dataset(DatasetError::Empty))));
    }

    #[test]
    fn test_tiny_iteration_budget_still_returns_model() {
        let cfg = TrainConfig {
            logistic: LogisticConfig { max_iter: 1, ..LogisticConfig::default() },
            ..TrainConfig::default()
        };
        let model = train_model(&cfg).unwrap();
        assert_eq!(model.classifier.iterations, 1);
        assert!(model.validate().is_ok());
    }
}
