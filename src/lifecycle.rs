//! Model lifecycle: making sure a fitted model exists, and holding the
//! one the service is currently scoring with.

use anyhow::Result;
use arc_swap::ArcSwapOption;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::ModelConfig;
use crate::model::{train_model, TrainConfig, TrainedModel};
use crate::storage;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("model not found at {} and train_on_start is disabled", .0.display())]
    ModelUnavailable(PathBuf),
}

/// Load the persisted model, or train and persist one when allowed.
///
/// Errors with `LifecycleError::ModelUnavailable` when there is no
/// artifact and training on start is disabled.
pub fn ensure_model(model_cfg: &ModelConfig, train_cfg: &TrainConfig) -> Result<TrainedModel> {
    if let Some(model) = storage::load_model(&model_cfg.path)? {
        return Ok(model);
    }

    if !model_cfg.train_on_start {
        return Err(LifecycleError::ModelUnavailable(model_cfg.path.clone()).into());
    }

    info!(
        path = %model_cfg.path.display(),
        samples = train_cfg.samples,
        seed = train_cfg.seed,
        "No model on disk, training a fresh one"
    );
    let model = train_model(train_cfg)?;
    storage::save_model(&model, &model_cfg.path)?;
    info!(path = %model_cfg.path.display(), "Model saved");

    Ok(model)
}

// ---------------------------------------------------------------------------
// Model slot
// ---------------------------------------------------------------------------

/// The model currently used for scoring.
///
/// Readers take a snapshot per request; installing a new model swaps the
/// reference atomically and never mutates a model in place.
#[derive(Debug, Default)]
pub struct ModelSlot {
    current: ArcSwapOption<TrainedModel>,
}

impl ModelSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        let slot = Self::empty();
        slot.install(model);
        slot
    }

    /// Snapshot of the current model, if any.
    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replace the current model. Returns the previous one.
    pub fn install(&self, model: TrainedModel) -> Option<Arc<TrainedModel>> {
        self.current.swap(Some(Arc::new(model)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixed_model;

    fn temp_model_cfg(train_on_start: bool) -> ModelConfig {
        let mut path = std::env::temp_dir();
        path.push(format!("fuel_risk_lifecycle_{}", uuid::Uuid::new_v4()));
        path.push("tx_model.json");
        ModelConfig {
            path,
            version: "test".into(),
            train_on_start,
        }
    }

    fn small_training() -> TrainConfig {
        TrainConfig { samples: 200, seed: 3, ..TrainConfig::default() }
    }

    #[test]
    fn test_missing_model_without_training_is_fatal() {
        let cfg = temp_model_cfg(false);
        let err = ensure_model(&cfg, &small_training()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::ModelUnavailable(_))
        ));
        assert!(!cfg.path.exists());
    }

    #[test]
    fn test_trains_and_persists_when_allowed() {
        let cfg = temp_model_cfg(true);
        let model = ensure_model(&cfg, &small_training()).unwrap();
        assert!(cfg.path.exists());
        assert_eq!(model.training.samples, 200);

        // Second call loads the persisted artifact instead of retraining.
        let reloaded = ensure_model(&ModelConfig { train_on_start: false, ..cfg.clone() }, &small_training()).unwrap();
        assert_eq!(reloaded.classifier, model.classifier);
        assert_eq!(reloaded.training.trained_at, model.training.trained_at);

        std::fs::remove_dir_all(cfg.path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_existing_artifact_is_loaded() {
        let cfg = temp_model_cfg(false);
        storage::save_model(&fixed_model(), &cfg.path).unwrap();
        let model = ensure_model(&cfg, &small_training()).unwrap();
        assert_eq!(model.classifier, fixed_model().classifier);
        std::fs::remove_dir_all(cfg.path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_slot_swap() {
        let slot = ModelSlot::empty();
        assert!(!slot.is_loaded());
        assert!(slot.current().is_none());

        assert!(slot.install(fixed_model()).is_none());
        let first = slot.current().unwrap();

        let mut replacement = fixed_model();
        replacement.classifier.intercept = -5.0;
        let previous = slot.install(replacement).unwrap();

        // Snapshots taken before the swap are unaffected.
        assert!(Arc::ptr_eq(&first, &previous));
        assert_eq!(first.classifier.intercept, -2.0);
        assert_eq!(slot.current().unwrap().classifier.intercept, -5.0);
    }

    #[test]
    fn test_slot_with_model() {
        let slot = ModelSlot::with_model(fixed_model());
        assert!(slot.is_loaded());
    }
}
