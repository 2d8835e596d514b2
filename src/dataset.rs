//! Synthetic training data.
//!
//! Generates plausible dispenses (tank capacity, fill level, pump price),
//! labels them with simple domain rules, then overwrites a share of rows
//! with overfill / overpriced anomalies so the positive class is large
//! enough for the classifier to learn a stable boundary.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::types::FEATURE_COUNT;

// ---------------------------------------------------------------------------
// Generator parameters
// ---------------------------------------------------------------------------

const CAPACITY_MEAN: f64 = 95.0;
const CAPACITY_STD: f64 = 20.0;
const CAPACITY_MIN: f64 = 40.0;
const CAPACITY_MAX: f64 = 160.0;

const FILL_MEAN: f64 = 0.6;
const FILL_STD: f64 = 0.15;

const PRICE_MEAN: f64 = 2.55;
const PRICE_STD: f64 = 0.08;

/// Rule thresholds for the initial labeling.
const RATIO_HIGH: f64 = 1.1;
const RATIO_LOW: f64 = 0.15;
const PRICE_HIGH: f64 = 2.9;
const PRICE_LOW: f64 = 2.2;

/// Injected anomaly ranges.
const OVERFILL_RANGE: (f64, f64) = (1.2, 1.8);
const OVERPRICE_RANGE: (f64, f64) = (2.9, 3.4);

/// Floor on the number of injected anomalies.
const MIN_INJECTED: usize = 20;

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Labeled synthetic dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDataset {
    /// Shape `(n, 5)`, columns `[liters, unit_price, total_amount, capacity, ratio]`.
    pub features: Array2<f64>,
    /// 1 = anomalous, 0 = normal.
    pub labels: Array1<u8>,
    /// Row index chosen by each injection draw, in draw order. May repeat.
    pub injected: Vec<usize>,
}

impl SyntheticDataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("sample count must be positive")]
    Empty,

    #[error("invalid distribution parameters: {0}")]
    Distribution(String),
}

/// Number of anomaly injection draws for a dataset of `samples` rows.
pub fn injection_count(samples: usize) -> usize {
    MIN_INJECTED.max(samples / 10)
}

/// Rule-based label: suspicious fill ratio or pump price.
pub fn rule_label(ratio: f64, unit_price: f64) -> u8 {
    let suspicious = ratio > RATIO_HIGH
        || ratio < RATIO_LOW
        || unit_price > PRICE_HIGH
        || unit_price < PRICE_LOW;
    u8::from(suspicious)
}

/// Build a reproducible dataset from a seed.
pub fn build_dataset(samples: usize, seed: u64) -> Result<SyntheticDataset, DatasetError> {
    let mut rng = StdRng::seed_from_u64(seed);
    build_dataset_with(&mut rng, samples)
}

/// Build a dataset drawing from the supplied random source.
///
/// Draw order is column-wise: every capacity, then every fill factor,
/// then every price, then the injection draws.
pub fn build_dataset_with<R: Rng + ?Sized>(
    rng: &mut R,
    samples: usize,
) -> Result<SyntheticDataset, DatasetError> {
    if samples == 0 {
        return Err(DatasetError::Empty);
    }

    let capacity_dist = normal(CAPACITY_MEAN, CAPACITY_STD)?;
    let fill_dist = normal(FILL_MEAN, FILL_STD)?;
    let price_dist = normal(PRICE_MEAN, PRICE_STD)?;

    let capacity: Vec<f64> = (0..samples)
        .map(|_| capacity_dist.sample(rng).clamp(CAPACITY_MIN, CAPACITY_MAX))
        .collect();
    let mut liters: Vec<f64> = capacity
        .iter()
        .map(|c| c * fill_dist.sample(rng))
        .collect();
    let mut unit_price: Vec<f64> = (0..samples).map(|_| price_dist.sample(rng)).collect();

    let mut total_amount: Vec<f64> = liters.iter().zip(&unit_price).map(|(l, p)| l * p).collect();
    let mut ratio: Vec<f64> = liters.iter().zip(&capacity).map(|(l, c)| l / c).collect();

    let mut labels: Vec<u8> = ratio
        .iter()
        .zip(&unit_price)
        .map(|(&r, &p)| rule_label(r, p))
        .collect();
    let rule_positives = labels.iter().filter(|&&l| l == 1).count();

    // Rows may be drawn more than once; later draws overwrite earlier ones.
    let draws = injection_count(samples);
    let mut injected = Vec::with_capacity(draws);
    for _ in 0..draws {
        let idx = rng.gen_range(0..samples);
        liters[idx] = capacity[idx] * rng.gen_range(OVERFILL_RANGE.0..OVERFILL_RANGE.1);
        unit_price[idx] = rng.gen_range(OVERPRICE_RANGE.0..OVERPRICE_RANGE.1);
        total_amount[idx] = liters[idx] * unit_price[idx];
        ratio[idx] = liters[idx] / capacity[idx];
        labels[idx] = 1;
        injected.push(idx);
    }

    let mut features = Array2::<f64>::zeros((samples, FEATURE_COUNT));
    for (i, mut row) in features.rows_mut().into_iter().enumerate() {
        row[0] = liters[i];
        row[1] = unit_price[i];
        row[2] = total_amount[i];
        row[3] = capacity[i];
        row[4] = ratio[i];
    }

    let dataset = SyntheticDataset {
        features,
        labels: Array1::from(labels),
        injected,
    };

    debug!(
        samples,
        rule_positives,
        injected = draws,
        positives = dataset.positive_count(),
        "Synthetic dataset built"
    );

    Ok(dataset)
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>, DatasetError> {
    Normal::new(mean, std_dev).map_err(|e| DatasetError::Distribution(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
