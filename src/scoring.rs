//! Risk scoring.
//!
//! Normalizes a model's output to a probability in `[0, 1]` and maps it
//! to a tier. Thresholds are fixed: `>= 0.7` high, `>= 0.4` medium,
//! anything lower is low.

use crate::model::logistic::sigmoid;
use crate::model::{Prediction, TrainedModel};
use crate::types::{FeatureVector, RiskAssessment, RiskLabel};

/// Lower bound of the high tier.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
/// Lower bound of the medium tier.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

impl Prediction {
    /// Probability of the anomalous class.
    ///
    /// Class probabilities are clamped to absorb floating-point drift;
    /// decision scores go through the logistic function.
    pub fn risk_probability(&self) -> f64 {
        match *self {
            Prediction::ClassProbabilities { positive, .. } => positive.clamp(0.0, 1.0),
            Prediction::DecisionScore(score) => sigmoid(score),
        }
    }
}

impl RiskLabel {
    /// Tier for a risk score.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_RISK_THRESHOLD {
            RiskLabel::High
        } else if score >= MEDIUM_RISK_THRESHOLD {
            RiskLabel::Medium
        } else {
            RiskLabel::Low
        }
    }
}

/// Score one feature vector.
pub fn score(model: &TrainedModel, features: &FeatureVector) -> RiskAssessment {
    assess(model.predict(features))
}

/// Turn a raw prediction into an assessment.
pub fn assess(prediction: Prediction) -> RiskAssessment {
    let risk_score = prediction.risk_probability();
    RiskAssessment {
        risk_score,
        risk_label: RiskLabel::from_score(risk_score),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::build_features;
    use crate::model::{fixed_model, OutputMode};

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskLabel::from_score(0.4), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(0.39999), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(0.7), RiskLabel::High);
        assert_eq!(RiskLabel::from_score(0.69999), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(0.0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(1.0), RiskLabel::High);
    }

    #[test]
    fn test_tiers_are_monotonic() {
        let order = |l: RiskLabel| match l {
            RiskLabel::Low => 0,
            RiskLabel::Medium => 1,
            RiskLabel::High => 2,
        };
        let mut previous = 0;
        for i in 0..=1000 {
            let tier = order(RiskLabel::from_score(i as f64 / 1000.0));
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn test_probability_is_clamped() {
        let over = Prediction::ClassProbabilities { negative: -2e-10, positive: 1.0000000002 };
        assert_eq!(over.risk_probability(), 1.0);

        let under = Prediction::ClassProbabilities { negative: 1.0000000001, positive: -1e-10 };
        assert_eq!(under.risk_probability(), 0.0);

        let inside = Prediction::ClassProbabilities { negative: 0.35, positive: 0.65 };
        assert_eq!(inside.risk_probability(), 0.65);
    }

    #[test]
    fn test_decision_score_goes_through_logistic() {
        assert_eq!(Prediction::DecisionScore(0.0).risk_probability(), 0.5);
        let high = Prediction::DecisionScore(2.0).risk_probability();
        assert!((high - 1.0 / (1.0 + (-2.0f64).exp())).abs() < 1e-15);
        for s in [-1e6, -50.0, 50.0, 1e6] {
            let p = Prediction::DecisionScore(s).risk_probability();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_assess_labels_score() {
        let a = assess(Prediction::ClassProbabilities { negative: 0.2, positive: 0.8 });
        assert_eq!(a.risk_label, RiskLabel::High);
        assert_eq!(a.risk_score, 0.8);

        let b = assess(Prediction::DecisionScore(0.0));
        assert_eq!(b.risk_label, RiskLabel::Medium);
    }

    #[test]
    fn test_both_output_modes_agree() {
        let fv = build_features(70.0, 2.7, 189.0, Some(80.0));
        let proba = score(&fixed_model(), &fv);
        let margin = score(&fixed_model().with_output_mode(OutputMode::DecisionScore), &fv);
        assert!((proba.risk_score - margin.risk_score).abs() < 1e-12);
        assert_eq!(proba.risk_label, margin.risk_label);
    }

    #[test]
    fn test_score_always_bounded() {
        let model = fixed_model();
        for liters in [0.1, 5.0, 60.0, 400.0, 10_000.0] {
            for price in [0.01, 2.5, 50.0] {
                for capacity in [None, Some(1.0), Some(95.0)] {
                    let fv = build_features(liters, price, liters * price, capacity);
                    let s = score(&model, &fv).risk_score;
                    assert!((0.0..=1.0).contains(&s), "score {s} out of range");
                }
            }
        }
    }
}
