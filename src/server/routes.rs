//! Scoring API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ServiceState>`.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::ApiError;
use crate::config::ModelConfig;
use crate::lifecycle::{ensure_model, ModelSlot};
use crate::model::TrainConfig;
use crate::scoring;
use crate::types::{RiskLabel, TransactionRecord};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServiceState {
    pub models: ModelSlot,
    pub model_config: ModelConfig,
    pub train_config: TrainConfig,
}

impl ServiceState {
    pub fn new(models: ModelSlot, model_config: ModelConfig, train_config: TrainConfig) -> Self {
        Self {
            models,
            model_config,
            train_config,
        }
    }

    pub fn model_version(&self) -> &str {
        &self.model_config.version
    }
}

pub type AppState = Arc<ServiceState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub risk_score: f64,
    pub risk_label: RiskLabel,
    pub model_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub model_loaded: bool,
    pub model_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    pub reloaded: bool,
    pub model_version: String,
    pub trained_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded = state.models.is_loaded();
    Json(HealthResponse {
        ok: loaded,
        model_loaded: loaded,
        model_version: state.model_version().to_string(),
    })
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(tx) = payload?;
    tx.validate()?;

    let model = state.models.current().ok_or(ApiError::ModelUnavailable)?;

    let assessment = scoring::score(&model, &tx.features());

    debug!(
        request_id = %uuid::Uuid::new_v4(),
        transaction = %tx,
        risk_score = assessment.risk_score,
        risk_label = %assessment.risk_label,
        "Transaction scored"
    );

    Ok(Json(PredictResponse {
        risk_score: assessment.risk_score,
        risk_label: assessment.risk_label,
        model_version: state.model_version().to_string(),
    }))
}

/// POST /model/reload
///
/// Re-reads the artifact (training one if allowed and missing) and swaps
/// it in. On failure the previously installed model keeps serving.
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let model_cfg = state.model_config.clone();
    let train_cfg = state.train_config;

    let loaded = tokio::task::spawn_blocking(move || ensure_model(&model_cfg, &train_cfg))
        .await
        .map_err(|e| ApiError::ReloadFailed(e.to_string()))?
        .map_err(|e| {
            warn!(error = %e, "Model reload failed, keeping current model");
            ApiError::ReloadFailed(format!("{e:#}"))
        })?;

    let trained_at = loaded.training.trained_at;
    state.models.install(loaded);
    info!(%trained_at, "Model reloaded");

    Ok(Json(ReloadResponse {
        reloaded: true,
        model_version: state.model_version().to_string(),
        trained_at,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
