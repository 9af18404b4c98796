//! Shared types for the APPRAISE valuation engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that model, engine, and config
//! modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Property inputs
// ---------------------------------------------------------------------------

/// Attributes of the property being valued.
///
/// Created once per valuation request and never mutated. Scores are
/// normalized fractions in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFeatures {
    pub square_feet: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub age_years: u32,
    pub lot_size_sqft: f64,
    pub garage_spaces: u32,
    pub has_pool: bool,
    pub has_renovated_kitchen: bool,
    /// Physical condition (0 = derelict, 1 = pristine)
    pub condition_score: f64,
    /// Neighbourhood desirability (0–1)
    pub location_score: f64,
    /// Quality of outlook (0–1)
    pub view_score: f64,
    /// Local school rating (0–1)
    pub school_score: f64,
}

impl fmt::Display for PropertyFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} sqft | {}bd/{:.1}ba | {}yo | cond={:.2} loc={:.2}",
            self.square_feet,
            self.bedrooms,
            self.bathrooms,
            self.age_years,
            self.condition_score,
            self.location_score,
        )
    }
}

/// A recent transaction for a similar property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparableSale {
    pub sale_price: Decimal,
    pub square_feet: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub distance_miles: f64,
    pub months_since_sale: u32,
}

impl ComparableSale {
    /// Price per square foot, or `None` when square footage is unusable.
    pub fn price_per_square_foot(&self) -> Option<Decimal> {
        if self.square_feet <= 0.0 {
            return None;
        }
        let sqft = Decimal::try_from(self.square_feet).ok()?;
        Some(self.sale_price / sqft)
    }
}

impl fmt::Display for ComparableSale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${} | {:.0} sqft | {:.1}mi | {}mo ago",
            self.sale_price, self.square_feet, self.distance_miles, self.months_since_sale,
        )
    }
}

/// Local market statistics for the subject property's area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    pub average_monthly_rent: Decimal,
    pub price_per_square_foot: Decimal,
    /// Year-over-year price appreciation, in percent (3.5 = 3.5%/yr)
    pub annual_appreciation_pct: f64,
    pub days_on_market: u32,
}

impl MarketData {
    /// Annualized market rent (monthly rent × 12).
    pub fn annual_rent(&self) -> Decimal {
        self.average_monthly_rent * Decimal::from(12)
    }
}

impl fmt::Display for MarketData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rent=${}/mo | ${}/sqft | appr={:.1}%/yr | DOM={}",
            self.average_monthly_rent,
            self.price_per_square_foot,
            self.annual_appreciation_pct,
            self.days_on_market,
        )
    }
}

// ---------------------------------------------------------------------------
// Model outputs
// ---------------------------------------------------------------------------

/// Raw output of a single valuation model run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEstimate {
    pub value: Decimal,
    /// Model self-reported confidence (0–1)
    pub confidence: f64,
}

/// A model's estimate annotated with its registered accuracy.
///
/// One instance per model per request; owned by the request's
/// computation and retained only inside the final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResult {
    pub model_name: String,
    pub estimated_value: Decimal,
    /// Model self-reported confidence (0–1)
    pub confidence_score: f64,
    /// Registered historical accuracy (0–1]
    pub model_accuracy: f64,
}

impl fmt::Display for ModelResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ${} (conf={:.0}% acc={:.0}%)",
            self.model_name,
            self.estimated_value,
            self.confidence_score * 100.0,
            self.model_accuracy * 100.0,
        )
    }
}

/// Combined valuation across all participating models.
///
/// Derived once by the ensembler and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleValuation {
    pub estimated_value: Decimal,
    /// Agreement-adjusted confidence, capped at 0.95
    pub confidence_score: f64,
    pub per_model_results: HashMap<String, ModelResult>,
    /// Accuracy-normalized weights; sum to 1
    pub per_model_weights: HashMap<String, f64>,
}

impl EnsembleValuation {
    /// Number of models that contributed to the estimate.
    pub fn model_count(&self) -> usize {
        self.per_model_results.len()
    }

    /// The raw per-model values, in model-name order.
    pub fn raw_values(&self) -> Vec<Decimal> {
        let mut names: Vec<&String> = self.per_model_results.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|n| self.per_model_results[n].estimated_value)
            .collect()
    }
}

impl fmt::Display for EnsembleValuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${} (conf={:.0}%, {} models)",
            self.estimated_value,
            self.confidence_score * 100.0,
            self.model_count(),
        )
    }
}

/// 95% confidence interval around the ensemble estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceIntervals {
    pub lower_bound: Decimal,
    pub upper_bound: Decimal,
    /// Fixed at 0.95
    pub confidence_level: f64,
    pub standard_deviation: Decimal,
    pub sample_size: usize,
}

impl ConfidenceIntervals {
    /// Width of the interval (upper − lower).
    pub fn width(&self) -> Decimal {
        self.upper_bound - self.lower_bound
    }

    /// Whether a value falls inside the interval (inclusive).
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.lower_bound && value <= self.upper_bound
    }
}

impl fmt::Display for ConfidenceIntervals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[${} , ${}] @ {:.0}% (σ=${}, n={})",
            self.lower_bound,
            self.upper_bound,
            self.confidence_level * 100.0,
            self.standard_deviation,
            self.sample_size,
        )
    }
}

// ---------------------------------------------------------------------------
// Adjustments
// ---------------------------------------------------------------------------

/// Category of a valuation adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustmentKind {
    Location,
    Age,
    Condition,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentKind::Location => write!(f, "LOCATION"),
            AdjustmentKind::Age => write!(f, "AGE"),
            AdjustmentKind::Condition => write!(f, "CONDITION"),
        }
    }
}

/// A single reason-coded percentage adjustment.
///
/// `percentage` is a signed fraction: −0.05 means −5%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub percentage: f64,
    pub reason: String,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+.1}%: {}", self.kind, self.percentage * 100.0, self.reason)
    }
}

/// All adjustments triggered for a request, plus their applied result.
///
/// Adjustments are additive; order does not affect the total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentSummary {
    pub adjustments: Vec<Adjustment>,
    /// Sum of all triggered percentages (signed fraction)
    pub total_percentage: f64,
    /// `estimated_value * (1 + total_percentage)`
    pub adjusted_value: Decimal,
}

impl AdjustmentSummary {
    /// Whether any rule triggered.
    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty()
    }
}

impl fmt::Display for AdjustmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} adjustment(s), total {:+.1}% → ${}",
            self.adjustments.len(),
            self.total_percentage * 100.0,
            self.adjusted_value,
        )
    }
}

// ---------------------------------------------------------------------------
// Investment metrics
// ---------------------------------------------------------------------------

/// Investment metrics derived from the adjusted estimate and market rent.
///
/// Yields, cap rate, and ROI are expressed in percent (6.0 = 6%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentMetrics {
    pub estimated_value: Decimal,
    pub average_monthly_rent: Decimal,
    pub gross_yield: Decimal,
    pub net_yield: Decimal,
    pub cap_rate: Decimal,
    pub annual_cash_flow: Decimal,
    pub roi: Decimal,
    pub payback_period_years: Decimal,
}

impl fmt::Display for InvestmentMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gross={:.2}% net={:.2}% cap={:.2}% | cash=${}/yr | roi={:.2}% | payback={:.1}yr",
            self.gross_yield,
            self.net_yield,
            self.cap_rate,
            self.annual_cash_flow,
            self.roi,
            self.payback_period_years,
        )
    }
}

// ---------------------------------------------------------------------------
// Valuation report
// ---------------------------------------------------------------------------

/// Full output of one valuation request: every pipeline stage's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    pub valuation: EnsembleValuation,
    pub intervals: ConfidenceIntervals,
    pub adjustments: AdjustmentSummary,
    pub metrics: InvestmentMetrics,
    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for ValuationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.valuation, self.intervals, self.adjustments, self.metrics,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for APPRAISE.
#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("Insufficient models: need at least {needed}, got {available}")]
    InsufficientModels { needed: usize, available: usize },

    #[error("Model error ({model}): {message}")]
    Model { model: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
