//! Confidence interval derivation.
//!
//! Builds a 95% interval around the ensemble estimate from the
//! dispersion of the raw per-model values. The standard deviation is
//! computed about the raw (unweighted) mean even though the point
//! estimate is accuracy-weighted; that asymmetry is a retained,
//! tested behavior, not an accident.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::stats::population_std_dev;
use crate::types::ConfidenceIntervals;

/// Two-sided z-score for the fixed 95% confidence level.
const Z_95: Decimal = dec!(1.96);

const CONFIDENCE_LEVEL: f64 = 0.95;

/// Compute the 95% interval around `estimated_value`.
///
/// With fewer than two values the standard deviation is defined as
/// zero and the interval collapses to the estimate itself.
pub fn confidence_intervals(values: &[Decimal], estimated_value: Decimal) -> ConfidenceIntervals {
    let standard_deviation = population_std_dev(values);
    let margin = Z_95 * standard_deviation;

    ConfidenceIntervals {
        lower_bound: estimated_value - margin,
        upper_bound: estimated_value + margin,
        confidence_level: CONFIDENCE_LEVEL,
        standard_deviation,
        sample_size: values.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
