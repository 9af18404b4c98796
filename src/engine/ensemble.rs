//! Ensemble combination.
//!
//! Folds per-model results into one accuracy-weighted estimate with a
//! model-agreement-aware confidence score.

use std::collections::HashMap;
use tracing::debug;

use rust_decimal::Decimal;

use crate::stats::{decimal_to_f64, f64_to_decimal, mean, population_std_dev};
use crate::types::{EnsembleValuation, ModelResult, ValuationError};

/// Hard ceiling on the ensemble confidence score.
const MAX_CONFIDENCE: f64 = 0.95;

/// How much full model agreement can add to the mean confidence.
const AGREEMENT_BONUS: f64 = 0.10;

/// Combine per-model results into a single valuation.
///
/// Each model's weight is its registered accuracy normalized by the sum
/// of all participating accuracies; the estimate is the weighted sum of
/// model values. Output depends only on the set of results, not on map
/// iteration order.
pub fn combine(
    results: &HashMap<String, ModelResult>,
) -> Result<EnsembleValuation, ValuationError> {
    if results.is_empty() {
        return Err(ValuationError::InsufficientModels { needed: 1, available: 0 });
    }

    // Fix an iteration order so map internals cannot leak into the
    // arithmetic or the logs.
    let mut ordered: Vec<&ModelResult> = results.values().collect();
    ordered.sort_by(|a, b| a.model_name.cmp(&b.model_name));

    let total_accuracy: f64 = ordered.iter().map(|r| r.model_accuracy).sum();
    if total_accuracy <= 0.0 {
        return Err(ValuationError::Config(
            "model accuracies must sum to a positive value".to_string(),
        ));
    }

    let per_model_weights: HashMap<String, f64> = ordered
        .iter()
        .map(|r| (r.model_name.clone(), r.model_accuracy / total_accuracy))
        .collect();

    let estimated_value = if ordered.len() == 1 {
        ordered[0].estimated_value
    } else {
        let weighted_sum: Decimal = ordered
            .iter()
            .map(|r| f64_to_decimal(r.model_accuracy) * r.estimated_value)
            .sum();
        weighted_sum / f64_to_decimal(total_accuracy)
    };

    let values: Vec<Decimal> = ordered.iter().map(|r| r.estimated_value).collect();
    let agreement = agreement_score(&values);

    let mean_confidence: f64 =
        ordered.iter().map(|r| r.confidence_score).sum::<f64>() / ordered.len() as f64;
    let confidence_score = (mean_confidence + AGREEMENT_BONUS * agreement).min(MAX_CONFIDENCE);

    debug!(
        models = ordered.len(),
        estimate = %estimated_value,
        agreement,
        confidence = confidence_score,
        "Ensemble combined"
    );

    Ok(EnsembleValuation {
        estimated_value,
        confidence_score,
        per_model_results: results.clone(),
        per_model_weights,
    })
}

/// Model agreement: 1 − (σ / mean) over the raw values, clamped to
/// [0, 1]. A single value is full agreement; a zero mean is none.
fn agreement_score(values: &[Decimal]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }
    let mu = mean(values);
    if mu.is_zero() {
        return 0.0;
    }
    let sigma = population_std_dev(values);
    let dispersion = decimal_to_f64(sigma) / decimal_to_f64(mu);
    (1.0 - dispersion).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_result(name: &str, value: Decimal, confidence: f64, accuracy: f64) -> ModelResult {
        ModelResult {
            model_name: name.to_string(),
            estimated_value: value,
            confidence_score: confidence,
            model_accuracy: accuracy,
        }
    }

    fn make_results(entries: &[(&str, Decimal, f64, f64)]) -> HashMap<String, ModelResult> {
        entries
            .iter()
            .map(|(name, value, conf, acc)| {
                (name.to_string(), make_result(name, *value, *conf, *acc))
            })
            .collect()
    }

    #[test]
    fn test_weights_sum_to_one() {
        let results = make_results(&[
            ("m1", dec!(200000), 0.9, 0.92),
            ("m2", dec!(210000), 0.85, 0.89),
            ("m3", dec!(195000), 0.88, 0.94),
        ]);
        let valuation = combine(&results).unwrap();
        let sum: f64 = valuation.per_model_weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "weights sum to {sum}");
    }

    #[test]
    fn test_weighted_estimate() {
        let results = make_results(&[
            ("m1", dec!(200000), 0.9, 0.92),
            ("m2", dec!(210000), 0.85, 0.89),
            ("m3", dec!(195000), 0.88, 0.94),
        ]);
        let valuation = combine(&results).unwrap();
        // (0.92·200000 + 0.89·210000 + 0.94·195000) / 2.75 = 201527.27...
        assert!(
            (valuation.estimated_value - dec!(201527.27)).abs() < dec!(0.01),
            "estimate = {}",
            valuation.estimated_value
        );
    }

    #[test]
    fn test_higher_accuracy_pulls_estimate() {
        let results = make_results(&[
            ("low", dec!(100000), 0.8, 0.10),
            ("high", dec!(200000), 0.8, 0.90),
        ]);
        let valuation = combine(&results).unwrap();
        // Estimate sits much closer to the high-accuracy model
        assert!(valuation.estimated_value > dec!(180000));
        assert!((valuation.per_model_weights["high"] - 0.9).abs() < 1e-9);
        assert!((valuation.per_model_weights["low"] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_single_model_exact_value_and_full_agreement() {
        let results = make_results(&[("only", dec!(425000), 0.8, 0.9)]);
        let valuation = combine(&results).unwrap();
        assert_eq!(valuation.estimated_value, dec!(425000));
        assert!((valuation.per_model_weights["only"] - 1.0).abs() < 1e-12);
        // agreement = 1 → confidence = 0.8 + 0.10
        assert!((valuation.confidence_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_empty_results_fail() {
        let err = combine(&HashMap::new()).unwrap_err();
        assert!(matches!(err, ValuationError::InsufficientModels { available: 0, .. }));
    }

    #[test]
    fn test_confidence_capped() {
        let results = make_results(&[
            ("m1", dec!(200000), 0.92, 0.9),
            ("m2", dec!(200000), 0.94, 0.9),
        ]);
        let valuation = combine(&results).unwrap();
        // mean 0.93 + full agreement bonus 0.10 would exceed the cap
        assert!((valuation.confidence_score - MAX_CONFIDENCE).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_at_least_min_model_confidence() {
        let results = make_results(&[
            ("m1", dec!(200000), 0.6, 0.9),
            ("m2", dec!(205000), 0.9, 0.9),
        ]);
        let valuation = combine(&results).unwrap();
        assert!(valuation.confidence_score >= 0.6);
        assert!(valuation.confidence_score <= MAX_CONFIDENCE);
    }

    #[test]
    fn test_agreement_tight_vs_dispersed() {
        let tight = make_results(&[
            ("m1", dec!(200000), 0.8, 0.9),
            ("m2", dec!(201000), 0.8, 0.9),
        ]);
        let dispersed = make_results(&[
            ("m1", dec!(100000), 0.8, 0.9),
            ("m2", dec!(300000), 0.8, 0.9),
        ]);
        let tight_conf = combine(&tight).unwrap().confidence_score;
        let dispersed_conf = combine(&dispersed).unwrap().confidence_score;
        assert!(tight_conf > dispersed_conf);
    }

    #[test]
    fn test_agreement_zero_mean() {
        // Values cancelling to a zero mean give zero agreement
        let values = vec![dec!(100000), dec!(-100000)];
        assert_eq!(agreement_score(&values), 0.0);
    }

    #[test]
    fn test_agreement_identical_values() {
        let values = vec![dec!(250000), dec!(250000), dec!(250000)];
        assert!((agreement_score(&values) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_insertion_order_does_not_change_output() {
        let forward = make_results(&[
            ("m1", dec!(200000), 0.9, 0.92),
            ("m2", dec!(210000), 0.85, 0.89),
            ("m3", dec!(195000), 0.88, 0.94),
        ]);
        let reversed = make_results(&[
            ("m3", dec!(195000), 0.88, 0.94),
            ("m2", dec!(210000), 0.85, 0.89),
            ("m1", dec!(200000), 0.9, 0.92),
        ]);
        let a = combine(&forward).unwrap();
        let b = combine(&reversed).unwrap();
        assert_eq!(a.estimated_value, b.estimated_value);
        assert!((a.confidence_score - b.confidence_score).abs() < 1e-15);
    }

    #[test]
    fn test_results_preserved_in_output() {
        let results = make_results(&[
            ("m1", dec!(200000), 0.9, 0.92),
            ("m2", dec!(210000), 0.85, 0.89),
        ]);
        let valuation = combine(&results).unwrap();
        assert_eq!(valuation.model_count(), 2);
        assert_eq!(valuation.per_model_results["m2"].estimated_value, dec!(210000));
    }
}
