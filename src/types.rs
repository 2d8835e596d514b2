//! Shared types for the risk scoring pipeline.
//!
//! These types form the data model used across all modules: the raw
//! transaction as it arrives at the boundary, the derived feature vector,
//! and the risk assessment returned to callers.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A single fuel dispense as reported by a station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Volume dispensed, in liters.
    pub liters: f64,
    /// Price per liter.
    pub unit_price: f64,
    /// Amount charged for the whole dispense.
    pub total_amount: f64,
    /// Tank capacity of the vehicle, when known.
    #[serde(default)]
    pub capacity_liters: Option<f64>,
}

impl TransactionRecord {
    pub fn new(liters: f64, unit_price: f64, total_amount: f64, capacity_liters: Option<f64>) -> Self {
        Self {
            liters,
            unit_price,
            total_amount,
            capacity_liters,
        }
    }

    /// Reject records the feature builder is not defined for.
    ///
    /// Mandatory fields must be positive and finite; `capacity_liters`
    /// must be positive and finite when present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("liters", self.liters)?;
        check_positive("unit_price", self.unit_price)?;
        check_positive("total_amount", self.total_amount)?;
        if let Some(capacity) = self.capacity_liters {
            check_positive("capacity_liters", capacity)?;
        }
        Ok(())
    }

    /// Derive the model feature vector for this record.
    pub fn features(&self) -> FeatureVector {
        crate::features::build_features(
            self.liters,
            self.unit_price,
            self.total_amount,
            self.capacity_liters,
        )
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} L @ {:.3} = {:.2}",
            self.liters, self.unit_price, self.total_amount
        )?;
        if let Some(capacity) = self.capacity_liters {
            write!(f, " (tank {capacity:.0} L)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Feature vector
// ---------------------------------------------------------------------------

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 5;

/// Column names, in feature order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["liters", "unit_price", "total_amount", "capacity", "ratio"];

/// Fixed-order numeric encoding of a transaction:
/// `[liters, unit_price, total_amount, capacity, ratio]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn liters(&self) -> f64 {
        self.0[0]
    }

    pub fn unit_price(&self) -> f64 {
        self.0[1]
    }

    pub fn total_amount(&self) -> f64 {
        self.0[2]
    }

    /// Effective tank capacity (always > 0).
    pub fn capacity(&self) -> f64 {
        self.0[3]
    }

    /// Liters dispensed over effective capacity.
    pub fn ratio(&self) -> f64 {
        self.0[4]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Risk assessment
// ---------------------------------------------------------------------------

/// Discrete risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "low",
            RiskLabel::Medium => "medium",
            RiskLabel::High => "high",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability that a transaction is anomalous, plus its tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Always within `[0, 1]`.
    pub risk_score: f64,
    pub risk_label: RiskLabel,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Boundary validation failures for incoming transactions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_positive_fields() {
        let tx = TransactionRecord::new(50.0, 2.5, 125.0, Some(80.0));
        assert!(tx.validate().is_ok());

        let no_capacity = TransactionRecord::new(50.0, 2.5, 125.0, None);
        assert!(no_capacity.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let tx = TransactionRecord::new(0.0, 2.5, 125.0, None);
        assert_eq!(
            tx.validate(),
            Err(ValidationError::NotPositive { field: "liters", value: 0.0 })
        );

        let tx = TransactionRecord::new(10.0, -1.0, 125.0, None);
        assert!(matches!(
            tx.validate(),
            Err(ValidationError::NotPositive { field: "unit_price", .. })
        ));

        let tx = TransactionRecord::new(10.0, 2.5, 25.0, Some(0.0));
        assert!(matches!(
            tx.validate(),
            Err(ValidationError::NotPositive { field: "capacity_liters", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let tx = TransactionRecord::new(f64::NAN, 2.5, 125.0, None);
        assert!(tx.validate().is_err());

        let tx = TransactionRecord::new(10.0, 2.5, f64::INFINITY, None);
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_record_deserializes_without_capacity() {
        let tx: TransactionRecord =
            serde_json::from_str(r#"{"liters": 40, "unit_price": 2.6, "total_amount": 104}"#).unwrap();
        assert_eq!(tx.capacity_liters, None);
        assert!((tx.liters - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_risk_label_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLabel::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&RiskLabel::Medium).unwrap(), "\"medium\"");
        assert_eq!(format!("{}", RiskLabel::Low), "low");
    }

    #[test]
    fn test_feature_vector_accessors() {
        let fv = FeatureVector([50.0, 2.5, 125.0, 80.0, 0.625]);
        assert_eq!(fv.liters(), 50.0);
        assert_eq!(fv.capacity(), 80.0);
        assert_eq!(fv.ratio(), 0.625);
        assert_eq!(fv.as_slice().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_transaction_display() {
        let tx = TransactionRecord::new(50.0, 2.5, 125.0, Some(80.0));
        let shown = format!("{tx}");
        assert!(shown.contains("50.00 L"));
        assert!(shown.contains("tank 80 L"));
    }
}
