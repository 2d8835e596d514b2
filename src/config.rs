//! Configuration loading from TOML with environment variable overrides.
//!
//! Reads `config.toml` (or the file named by `FUEL_RISK_CONFIG`) and
//! deserializes into strongly-typed structs. Every section has defaults,
//! so a missing file is not an error; deployments that only set
//! environment variables (`MODEL_PATH`, `MODEL_VERSION`, `TRAIN_ON_START`,
//! `FUEL_RISK_PORT`) keep working.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::model::logistic::LogisticConfig;
use crate::model::TrainConfig;
use crate::storage::DEFAULT_MODEL_PATH;

/// Default config file path.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "fuel-risk".into(),
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Where the fitted model artifact lives.
    pub path: PathBuf,
    /// Opaque version string echoed in every response.
    pub version: String,
    /// Train (and persist) a model when no artifact exists.
    pub train_on_start: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            version: "tx-risk-v1".into(),
            train_on_start: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub samples: usize,
    pub seed: u64,
    pub max_iter: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let defaults = TrainConfig::default();
        Self {
            samples: defaults.samples,
            seed: defaults.seed,
            max_iter: defaults.logistic.max_iter,
        }
    }
}

impl TrainingConfig {
    pub fn to_train_config(&self) -> TrainConfig {
        TrainConfig {
            samples: self.samples,
            seed: self.seed,
            logistic: LogisticConfig {
                max_iter: self.max_iter,
                ..LogisticConfig::default()
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults
    /// when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load from `FUEL_RISK_CONFIG` (or `config.toml`), then apply
    /// environment overrides.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("FUEL_RISK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        let mut config = Self::load(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("MODEL_PATH") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(version) = lookup("MODEL_VERSION") {
            self.model.version = version;
        }
        if let Some(flag) = lookup("TRAIN_ON_START") {
            self.model.train_on_start = parse_flag(&flag);
        }
        if let Some(port) = lookup("FUEL_RISK_PORT") {
            self.service.port = port
                .trim()
                .parse()
                .with_context(|| format!("FUEL_RISK_PORT is not a valid port: {port}"))?;
        }
        Ok(())
    }
}

/// `1`, `true` and `yes` (any case) are truthy; everything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
