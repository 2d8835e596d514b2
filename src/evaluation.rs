//! Model evaluation.
//!
//! Measures how well a fitted model's risk scores match the labels of a
//! (usually held-out) synthetic dataset: accuracy at 0.5, Brier score,
//! tier distribution, and a calibration curve.

use std::collections::HashMap;
use std::fmt;

use crate::dataset::SyntheticDataset;
use crate::model::TrainedModel;
use crate::scoring;
use crate::types::{FeatureVector, RiskLabel, FEATURE_COUNT};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A scored sample paired with its label.
#[derive(Debug, Clone, Copy)]
pub struct ScoredSample {
    pub risk_score: f64,
    pub anomalous: bool,
}

/// A bucket in the calibration curve (e.g., all scores between 0.60-0.70).
#[derive(Debug, Clone)]
pub struct CalibrationBucket {
    pub bin_start: f64,
    pub bin_end: f64,
    pub mean_predicted: f64,
    pub actual_rate: f64,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub samples: usize,
    pub positives: usize,
    /// Fraction of samples whose `score >= 0.5` agrees with the label.
    pub accuracy: f64,
    /// Mean squared error of the score against the 0/1 label. Lower is better.
    pub brier: f64,
    pub tier_counts: HashMap<RiskLabel, usize>,
    pub calibration_curve: Vec<CalibrationBucket>,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "samples={} positives={} accuracy={:.3} brier={:.4}",
            self.samples, self.positives, self.accuracy, self.brier
        )?;
        for label in [RiskLabel::Low, RiskLabel::Medium, RiskLabel::High] {
            writeln!(f, "  {label:<6} {}", self.tier_counts.get(&label).copied().unwrap_or(0))?;
        }
        for b in self.calibration_curve.iter().filter(|b| b.count > 0) {
            writeln!(
                f,
                "  [{:.1}, {:.1}) n={:<4} predicted={:.3} actual={:.3}",
                b.bin_start, b.bin_end, b.count, b.mean_predicted, b.actual_rate
            )?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Score every row of `dataset` and summarize.
pub fn evaluate(model: &TrainedModel, dataset: &SyntheticDataset) -> EvaluationReport {
    let samples: Vec<ScoredSample> = dataset
        .features
        .rows()
        .into_iter()
        .zip(dataset.labels.iter())
        .map(|(row, &label)| {
            let mut values = [0.0; FEATURE_COUNT];
            for (slot, v) in values.iter_mut().zip(row.iter()) {
                *slot = *v;
            }
            ScoredSample {
                risk_score: scoring::score(model, &FeatureVector(values)).risk_score,
                anomalous: label == 1,
            }
        })
        .collect();

    summarize(&samples, 10)
}

/// Summarize scored samples with `num_bins` calibration buckets.
pub fn summarize(samples: &[ScoredSample], num_bins: usize) -> EvaluationReport {
    let positives = samples.iter().filter(|s| s.anomalous).count();
    let mut tier_counts = HashMap::new();
    for s in samples {
        *tier_counts.entry(RiskLabel::from_score(s.risk_score)).or_insert(0) += 1;
    }

    if samples.is_empty() {
        return EvaluationReport {
            samples: 0,
            positives: 0,
            accuracy: 0.0,
            brier: 0.0,
            tier_counts,
            calibration_curve: Vec::new(),
        };
    }

    let n = samples.len() as f64;
    let correct = samples
        .iter()
        .filter(|s| (s.risk_score >= 0.5) == s.anomalous)
        .count();

    EvaluationReport {
        samples: samples.len(),
        positives,
        accuracy: correct as f64 / n,
        brier: brier_score(samples),
        tier_counts,
        calibration_curve: calibration_curve(samples, num_bins),
    }
}

/// Brier = (1/N) * Σ(predicted - outcome)²
pub fn brier_score(samples: &[ScoredSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .map(|s| {
            let outcome = if s.anomalous { 1.0 } else { 0.0 };
            (s.risk_score - outcome).powi(2)
        })
        .sum();
    sum / samples.len() as f64
}

/// Bin scores and compare each bin's mean score to its anomaly rate.
/// The last bin is closed so a score of exactly 1.0 is counted.
fn calibration_curve(samples: &[ScoredSample], num_bins: usize) -> Vec<CalibrationBucket> {
    let num_bins = num_bins.max(1);
    let bin_width = 1.0 / num_bins as f64;

    (0..num_bins)
        .map(|i| {
            let bin_start = i as f64 * bin_width;
            let bin_end = bin_start + bin_width;
            let last = i == num_bins - 1;

            let in_bin: Vec<&ScoredSample> = samples
                .iter()
                .filter(|s| s.risk_score >= bin_start && (s.risk_score < bin_end || (last && s.risk_score <= bin_end)))
                .collect();

            let count = in_bin.len();
            if count == 0 {
                return CalibrationBucket {
                    bin_start,
                    bin_end,
                    mean_predicted: (bin_start + bin_end) / 2.0,
                    actual_rate: 0.0,
                    count: 0,
                };
            }

            CalibrationBucket {
                bin_start,
                bin_end,
                mean_predicted: in_bin.iter().map(|s| s.risk_score).sum::<f64>() / count as f64,
                actual_rate: in_bin.iter().filter(|s| s.anomalous).count() as f64 / count as f64,
                count,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::build_dataset;
    use crate::model::{train_model, TrainConfig};

    fn sample(risk_score: f64, anomalous: bool) -> ScoredSample {
        ScoredSample { risk_score, anomalous }
    }

    #[test]
    fn test_perfect_predictions() {
        let samples = vec![sample(1.0, true), sample(0.0, false), sample(1.0, true)];
        let report = summarize(&samples, 10);
        assert_eq!(report.brier, 0.0);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.positives, 2);
        assert_eq!(report.calibration_curve[9].count, 2);
    }

    #[test]
    fn test_brier_score_at_50() {
        let samples: Vec<_> = (0..50)
            .flat_map(|_| [sample(0.5, true), sample(0.5, false)])
            .collect();
        assert!((brier_score(&samples) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_empty_summary() {
        let report = summarize(&[], 10);
        assert_eq!(report.samples, 0);
        assert!(report.calibration_curve.is_empty());
    }

    #[test]
    fn test_tier_counts() {
        let samples = vec![sample(0.1, false), sample(0.45, false), sample(0.9, true), sample(0.7, true)];
        let report = summarize(&samples, 10);
        assert_eq!(report.tier_counts[&RiskLabel::Low], 1);
        assert_eq!(report.tier_counts[&RiskLabel::Medium], 1);
        assert_eq!(report.tier_counts[&RiskLabel::High], 2);
    }

    #[test]
    fn test_calibration_buckets() {
        let mut samples = Vec::new();
        for _ in 0..10 {
            samples.push(sample(0.25, true));
            samples.push(sample(0.75, false));
        }
        let report = summarize(&samples, 10);
        assert_eq!(report.calibration_curve.len(), 10);
        let bucket = report
            .calibration_curve
            .iter()
            .find(|b| b.bin_start <= 0.25 && b.bin_end > 0.25)
            .unwrap();
        assert_eq!(bucket.count, 10);
        assert!((bucket.actual_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_trained_model_beats_chance_on_holdout() {
        let model = train_model(&TrainConfig::default()).unwrap();
        let holdout = build_dataset(400, 4242).unwrap();
        let report = evaluate(&model, &holdout);
        assert_eq!(report.samples, 400);
        assert!(report.accuracy > 0.85, "accuracy {}", report.accuracy);
        assert!(report.brier < 0.15, "brier {}", report.brier);
        assert!(format!("{report}").contains("accuracy="));
    }
}
