//! Valuation adjustments.
//!
//! Evaluates independent, reason-coded percentage rules against the
//! property's attributes. Each rule is tested on its own and appended
//! when its predicate holds; the total is a plain sum with no clamping,
//! and the adjusted value is `estimate × (1 + total)`.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::AdjustmentConfig;
use crate::stats::f64_to_decimal;
use crate::types::{Adjustment, AdjustmentKind, AdjustmentSummary, PropertyFeatures};

/// Applies the configured adjustment rules to a valuation.
pub struct AdjustmentEngine {
    config: AdjustmentConfig,
}

impl AdjustmentEngine {
    pub fn new(config: AdjustmentConfig) -> Self {
        Self { config }
    }

    /// Access the adjustment configuration.
    pub fn config(&self) -> &AdjustmentConfig {
        &self.config
    }

    /// Evaluate all rules against the subject and apply the total to
    /// the ensemble estimate.
    pub fn evaluate(
        &self,
        subject: &PropertyFeatures,
        estimated_value: Decimal,
    ) -> AdjustmentSummary {
        let adjustments: Vec<Adjustment> = [
            self.location_rule(subject),
            self.age_rule(subject),
            self.condition_rule(subject),
        ]
        .into_iter()
        .flatten()
        .collect();

        let total_percentage: f64 = adjustments.iter().map(|a| a.percentage).sum();
        let adjusted_value = estimated_value * f64_to_decimal(1.0 + total_percentage);

        debug!(
            triggered = adjustments.len(),
            total = %format!("{:+.1}%", total_percentage * 100.0),
            adjusted = %adjusted_value,
            "Adjustments evaluated"
        );

        AdjustmentSummary { adjustments, total_percentage, adjusted_value }
    }

    fn location_rule(&self, subject: &PropertyFeatures) -> Option<Adjustment> {
        if subject.location_score >= self.config.location_score_threshold {
            return None;
        }
        Some(Adjustment {
            kind: AdjustmentKind::Location,
            percentage: self.config.location_percentage,
            reason: format!(
                "Location score {:.2} below {:.2} threshold",
                subject.location_score, self.config.location_score_threshold,
            ),
        })
    }

    fn age_rule(&self, subject: &PropertyFeatures) -> Option<Adjustment> {
        if subject.age_years <= self.config.age_threshold_years {
            return None;
        }
        let excess_years = (subject.age_years - self.config.age_threshold_years) as f64;
        // Grows with excess age but never past the configured floor.
        let percentage =
            (self.config.age_percentage_per_year * excess_years).max(self.config.age_max_percentage);
        Some(Adjustment {
            kind: AdjustmentKind::Age,
            percentage,
            reason: format!(
                "Property age {} exceeds {} years",
                subject.age_years, self.config.age_threshold_years,
            ),
        })
    }

    fn condition_rule(&self, subject: &PropertyFeatures) -> Option<Adjustment> {
        if subject.condition_score >= self.config.condition_score_threshold {
            return None;
        }
        Some(Adjustment {
            kind: AdjustmentKind::Condition,
            percentage: self.config.condition_percentage,
            reason: format!(
                "Condition score {:.2} below {:.2} threshold",
                subject.condition_score, self.config.condition_score_threshold,
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
