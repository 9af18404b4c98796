//! Numeric helpers shared by the pipeline stages.
//!
//! Monetary arithmetic stays in `Decimal` (exact, order-independent
//! summation); the square root needed for the standard deviation runs
//! through an f64 round-trip since `Decimal` has no sqrt.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

pub(crate) fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

pub(crate) fn f64_to_decimal(f: f64) -> Decimal {
    if !f.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(f).unwrap_or(Decimal::ZERO)
}

/// Arithmetic mean. Zero for an empty slice.
pub(crate) fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().copied().sum();
    sum / Decimal::from(values.len() as u64)
}

/// Population standard deviation: sqrt of the mean squared deviation
/// from the mean. Zero for fewer than two values.
pub(crate) fn population_std_dev(values: &[Decimal]) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    let mu = mean(values);
    let sum_sq: Decimal = values.iter().map(|v| (*v - mu) * (*v - mu)).sum();
    let variance = sum_sq / Decimal::from(values.len() as u64);
    f64_to_decimal(decimal_to_f64(variance).sqrt())
}
