//! Feature derivation.
//!
//! Turns the raw transaction fields into the fixed 5-element vector the
//! classifier was trained on.

use crate::types::FeatureVector;

/// Build `[liters, unit_price, total_amount, capacity, ratio]`.
///
/// When the tank capacity is unknown (or not positive) the dispensed
/// volume stands in for it, floored at 1 liter, so `ratio` is always
/// defined.
pub fn build_features(
    liters: f64,
    unit_price: f64,
    total_amount: f64,
    capacity_liters: Option<f64>,
) -> FeatureVector {
    let capacity = effective_capacity(liters, capacity_liters);
    let ratio = liters / capacity;
    FeatureVector([liters, unit_price, total_amount, capacity, ratio])
}

/// Supplied capacity when positive, else `max(liters, 1.0)`.
pub fn effective_capacity(liters: f64, capacity_liters: Option<f64>) -> f64 {
    match capacity_liters {
        Some(c) if c > 0.0 => c,
        _ => liters.max(1.0),
    }
}
