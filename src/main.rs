//! fuel-risk — scoring service
//!
//! Entry point. Loads configuration, initialises structured logging,
//! makes sure a fitted model exists (loading it from disk or training a
//! fresh one), and serves risk scores over HTTP until Ctrl+C.

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info};

use fuel_risk::config::AppConfig;
use fuel_risk::lifecycle::{ensure_model, ModelSlot};
use fuel_risk::logging::init_logging;
use fuel_risk::server::{self, ServiceState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cfg = AppConfig::from_env()?;
    info!(
        service = %cfg.service.name,
        model_path = %cfg.model.path.display(),
        model_version = %cfg.model.version,
        train_on_start = cfg.model.train_on_start,
        "fuel-risk starting up"
    );

    // -- Model ----------------------------------------------------------

    let train_cfg = cfg.training.to_train_config();
    let model_cfg = cfg.model.clone();
    let model = tokio::task::spawn_blocking(move || ensure_model(&model_cfg, &train_cfg))
        .await
        .context("Model startup task panicked")?
        .inspect_err(|e| error!(error = %e, "No model available, refusing to serve"))?;

    info!(
        samples = model.training.samples,
        seed = model.training.seed,
        converged = model.classifier.converged,
        "Model ready"
    );

    // -- Serve ----------------------------------------------------------

    let state = Arc::new(ServiceState::new(
        ModelSlot::with_model(model),
        cfg.model.clone(),
        train_cfg,
    ));

    let host: IpAddr = cfg
        .service
        .host
        .parse()
        .with_context(|| format!("Invalid service host: {}", cfg.service.host))?;
    server::serve(state, SocketAddr::new(host, cfg.service.port)).await?;

    info!("fuel-risk shut down cleanly.");
    Ok(())
}
