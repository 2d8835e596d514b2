//! Model persistence.
//!
//! Saves and loads the fitted pipeline to/from a JSON artifact. The
//! artifact wraps the model with a format version so an incompatible
//! file fails loudly instead of scoring with misread parameters.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::model::TrainedModel;

/// Default artifact path.
pub const DEFAULT_MODEL_PATH: &str = "models/tx_model.json";

/// Artifact layout version written by this build.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    model: TrainedModel,
}

/// Write `model` to `path`, creating parent directories as needed.
pub fn save_model(model: &TrainedModel, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create model directory {}", parent.display()))?;
    }

    let artifact = ModelArtifact {
        format_version: FORMAT_VERSION,
        model: model.clone(),
    };
    let json = serde_json::to_string_pretty(&artifact).context("Failed to serialise model")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write model to {}", path.display()))?;

    debug!(path = %path.display(), "Model saved");
    Ok(())
}

/// Load a model artifact.
/// Returns None if the file doesn't exist.
pub fn load_model(path: &Path) -> Result<Option<TrainedModel>> {
    if !path.exists() {
        info!(path = %path.display(), "No model artifact found");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model from {}", path.display()))?;

    let artifact: ModelArtifact = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse model from {}", path.display()))?;

    if artifact.format_version != FORMAT_VERSION {
        bail!(
            "Unsupported model format version {} in {} (expected {FORMAT_VERSION})",
            artifact.format_version,
            path.display()
        );
    }

    let model = artifact.model;
    model
        .validate()
        .with_context(|| format!("Invalid model parameters in {}", path.display()))?;

    info!(
        path = %path.display(),
        samples = model.training.samples,
        seed = model.training.seed,
        trained_at = %model.training.trained_at,
        "Model loaded from disk"
    );

    Ok(Some(model))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
