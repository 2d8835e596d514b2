//! fuel-risk-train — offline model trainer
//!
//! Generates the synthetic dataset, fits the pipeline and writes the
//! artifact the scoring service loads on startup.

use anyhow::{ensure, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use fuel_risk::dataset::build_dataset;
use fuel_risk::evaluation::evaluate;
use fuel_risk::logging::init_logging;
use fuel_risk::model::{train_model, TrainConfig};
use fuel_risk::storage::{self, DEFAULT_MODEL_PATH};

/// Seed offset for the evaluation holdout, so it never equals the
/// training draw.
const HOLDOUT_SEED_OFFSET: u64 = 1_000_003;

#[derive(Parser, Debug)]
#[command(name = "fuel-risk-train")]
#[command(version)]
#[command(about = "Train the fuel transaction risk model on synthetic data", long_about = None)]
struct Args {
    /// Where to write the fitted model artifact
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MODEL_PATH)]
    model_path: PathBuf,

    /// Number of synthetic transactions to generate
    #[arg(long, default_value_t = 600)]
    samples: usize,

    /// Seed for the synthetic dataset
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Score a held-out synthetic dataset and print the report
    #[arg(long)]
    evaluate: bool,
}

fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    init_logging();

    let args = Args::parse();
    ensure!(args.samples > 0, "--samples must be a positive integer");

    let config = TrainConfig {
        samples: args.samples,
        seed: args.seed,
        ..TrainConfig::default()
    };
    let model = train_model(&config)?;
    storage::save_model(&model, &args.model_path)?;
    info!(path = %args.model_path.display(), "Model saved");

    if args.evaluate {
        let holdout = build_dataset(args.samples, args.seed.wrapping_add(HOLDOUT_SEED_OFFSET))?;
        let report = evaluate(&model, &holdout);
        println!("{report}");
    }

    Ok(())
}
