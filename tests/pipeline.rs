//! End-to-end pipeline tests.
//!
//! Drives the full valuation pipeline with deterministic stub models —
//! known values, known confidences, controllable failures — so every
//! stage's contribution to the final report can be asserted exactly.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use appraise::config::EngineConfig;
use appraise::engine::ValuationEngine;
use appraise::models::ValuationModel;
use appraise::types::*;

/// A stub valuation model returning a fixed estimate, or a forced error.
struct StubModel {
    name: &'static str,
    accuracy: f64,
    value: Decimal,
    confidence: f64,
    fail: bool,
}

impl StubModel {
    fn ok(name: &'static str, value: Decimal, confidence: f64, accuracy: f64) -> Arc<Self> {
        Arc::new(Self { name, accuracy, value, confidence, fail: false })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self { name, accuracy: 0.9, value: Decimal::ZERO, confidence: 0.0, fail: true })
    }
}

#[async_trait]
impl ValuationModel for StubModel {
    async fn estimate(
        &self,
        _subject: &PropertyFeatures,
        _comps: &[ComparableSale],
        _market: &MarketData,
    ) -> Result<ModelEstimate, ValuationError> {
        if self.fail {
            return Err(ValuationError::Model {
                model: self.name.to_string(),
                message: "forced failure".to_string(),
            });
        }
        Ok(ModelEstimate { value: self.value, confidence: self.confidence })
    }

    fn name(&self) -> &str {
        self.name
    }

    fn accuracy(&self) -> f64 {
        self.accuracy
    }
}

/// Install a test subscriber so `RUST_LOG=debug cargo test` shows the
/// pipeline's tracing output. Safe to call from every test.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn make_subject() -> PropertyFeatures {
    PropertyFeatures {
        square_feet: 1900.0,
        bedrooms: 3,
        bathrooms: 2.0,
        age_years: 8,
        lot_size_sqft: 6000.0,
        garage_spaces: 2,
        has_pool: false,
        has_renovated_kitchen: true,
        condition_score: 0.75,
        location_score: 0.80,
        view_score: 0.55,
        school_score: 0.70,
    }
}

fn make_market() -> MarketData {
    MarketData {
        average_monthly_rent: dec!(2000),
        price_per_square_foot: dec!(210),
        annual_appreciation_pct: 3.0,
        days_on_market: 25,
    }
}

/// The three-model reference scenario: values 200000/210000/195000 with
/// accuracies 0.92/0.89/0.94.
fn three_stub_models() -> Vec<Arc<dyn ValuationModel>> {
    vec![
        StubModel::ok("alpha", dec!(200000), 0.90, 0.92),
        StubModel::ok("beta", dec!(210000), 0.85, 0.89),
        StubModel::ok("gamma", dec!(195000), 0.88, 0.94),
    ]
}

#[tokio::test]
async fn test_full_pipeline_three_models() {
    init_tracing();
    let engine = ValuationEngine::with_models(three_stub_models(), &EngineConfig::default());
    let report = engine
        .appraise(&make_subject(), &[], &make_market())
        .await
        .unwrap();

    // Accuracy-weighted estimate:
    // (0.92·200000 + 0.89·210000 + 0.94·195000) / 2.75 ≈ 201527.27
    assert!(
        (report.valuation.estimated_value - dec!(201527.27)).abs() < dec!(0.01),
        "estimate = {}",
        report.valuation.estimated_value
    );

    // Weights normalize to 1
    let weight_sum: f64 = report.valuation.per_model_weights.values().sum();
    assert!((weight_sum - 1.0).abs() < 1e-9);

    // σ of the raw values ≈ 6236.1, interval brackets the estimate
    assert!((report.intervals.standard_deviation - dec!(6236.1)).abs() < dec!(0.1));
    assert_eq!(report.intervals.sample_size, 3);
    assert!(report.intervals.contains(report.valuation.estimated_value));
    assert!((report.intervals.confidence_level - 0.95).abs() < 1e-12);

    // Confidence stays within [0, 0.95]
    assert!(report.valuation.confidence_score > 0.0);
    assert!(report.valuation.confidence_score <= 0.95);

    // This subject triggers no adjustments
    assert!(report.adjustments.is_empty());
    assert_eq!(report.adjustments.adjusted_value, report.valuation.estimated_value);

    // Metrics derive from the adjusted value and market rent
    assert_eq!(report.metrics.annual_cash_flow, dec!(24000));
    assert_eq!(report.metrics.cap_rate, report.metrics.gross_yield);
    assert!(report.metrics.payback_period_years > Decimal::ZERO);
}

#[tokio::test]
async fn test_one_model_failure_is_absorbed() {
    init_tracing();
    let models: Vec<Arc<dyn ValuationModel>> = vec![
        StubModel::ok("alpha", dec!(200000), 0.90, 0.92),
        StubModel::failing("beta"),
        StubModel::ok("gamma", dec!(195000), 0.88, 0.94),
    ];
    let engine = ValuationEngine::with_models(models, &EngineConfig::default());
    let report = engine
        .appraise(&make_subject(), &[], &make_market())
        .await
        .unwrap();

    assert_eq!(report.valuation.model_count(), 2);
    assert!(!report.valuation.per_model_results.contains_key("beta"));
    let weight_sum: f64 = report.valuation.per_model_weights.values().sum();
    assert!((weight_sum - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_insufficient_models_is_fatal() {
    init_tracing();
    let models: Vec<Arc<dyn ValuationModel>> = vec![
        StubModel::ok("alpha", dec!(200000), 0.90, 0.92),
        StubModel::failing("beta"),
        StubModel::failing("gamma"),
    ];
    let engine = ValuationEngine::with_models(models, &EngineConfig::default());
    let err = engine
        .appraise(&make_subject(), &[], &make_market())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ValuationError::InsufficientModels { needed: 2, available: 1 }
    ));
}

#[tokio::test]
async fn test_identical_model_values_collapse_interval() {
    init_tracing();
    let models: Vec<Arc<dyn ValuationModel>> = vec![
        StubModel::ok("alpha", dec!(300000), 0.85, 0.90),
        StubModel::ok("beta", dec!(300000), 0.80, 0.88),
        StubModel::ok("gamma", dec!(300000), 0.82, 0.92),
    ];
    let engine = ValuationEngine::with_models(models, &EngineConfig::default());
    let report = engine
        .appraise(&make_subject(), &[], &make_market())
        .await
        .unwrap();

    assert!(
        (report.valuation.estimated_value - dec!(300000)).abs() < dec!(0.01),
        "estimate = {}",
        report.valuation.estimated_value
    );
    assert_eq!(report.intervals.standard_deviation, Decimal::ZERO);
    // Zero dispersion collapses the interval onto the estimate
    assert_eq!(report.intervals.lower_bound, report.valuation.estimated_value);
    assert_eq!(report.intervals.upper_bound, report.valuation.estimated_value);
}

#[tokio::test]
async fn test_adjustments_flow_into_metrics() {
    init_tracing();
    // location 0.5, age 30, condition 0.4 → −5% − 5% − 10% = −20%
    let mut subject = make_subject();
    subject.location_score = 0.5;
    subject.age_years = 30;
    subject.condition_score = 0.4;

    let models: Vec<Arc<dyn ValuationModel>> = vec![
        StubModel::ok("alpha", dec!(400000), 0.85, 0.90),
        StubModel::ok("beta", dec!(400000), 0.85, 0.90),
    ];
    let engine = ValuationEngine::with_models(models, &EngineConfig::default());
    let report = engine
        .appraise(&subject, &[], &make_market())
        .await
        .unwrap();

    assert_eq!(report.adjustments.adjustments.len(), 3);
    assert!((report.adjustments.total_percentage - (-0.20)).abs() < 1e-10);
    assert!((report.adjustments.adjusted_value - dec!(320000)).abs() < dec!(0.01));

    // gross yield on the adjusted value: 24000 / 320000 × 100 = 7.5%
    assert!((report.metrics.gross_yield - dec!(7.5)).abs() < dec!(0.001));
    assert_eq!(report.metrics.estimated_value, report.adjustments.adjusted_value);
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    init_tracing();
    let engine = ValuationEngine::with_models(three_stub_models(), &EngineConfig::default());
    let report = engine
        .appraise(&make_subject(), &[], &make_market())
        .await
        .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let parsed: ValuationReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.valuation.model_count(), 3);
    assert_eq!(parsed.intervals.sample_size, 3);
    assert_eq!(parsed.metrics.annual_cash_flow, report.metrics.annual_cash_flow);
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    init_tracing();
    let engine = Arc::new(ValuationEngine::with_models(
        three_stub_models(),
        &EngineConfig::default(),
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .appraise(&make_subject(), &[], &make_market())
                .await
                .unwrap()
        }));
    }

    let mut estimates = Vec::new();
    for handle in handles {
        estimates.push(handle.await.unwrap().valuation.estimated_value);
    }
    // Same inputs → same outputs, regardless of interleaving
    assert!(estimates.windows(2).all(|w| w[0] == w[1]));
}
