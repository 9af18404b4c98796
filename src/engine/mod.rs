//! Core engine — the run → ensemble → interval → adjust → metrics pipeline.

pub mod adjustments;
pub mod ensemble;
pub mod interval;
pub mod metrics;
pub mod runner;

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::config::EngineConfig;
use crate::models::{ModelRegistry, ValuationModel};
use crate::types::{ComparableSale, MarketData, PropertyFeatures, ValuationError, ValuationReport};

use adjustments::AdjustmentEngine;
use metrics::MetricsCalculator;
use runner::ModelRunner;

/// Orchestrates one full valuation request.
///
/// Stateless across calls: every request runs the same five stages over
/// its own immutable inputs. Concurrent requests do not interact.
pub struct ValuationEngine {
    runner: ModelRunner,
    adjustments: AdjustmentEngine,
    metrics: MetricsCalculator,
}

impl ValuationEngine {
    /// Build the engine from configuration, constructing the reference
    /// model registry.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ValuationError> {
        let registry = ModelRegistry::from_config(&config.models)?;
        Ok(Self::with_models(registry.into_models(), config))
    }

    /// Build the engine around externally supplied models.
    pub fn with_models(models: Vec<Arc<dyn ValuationModel>>, config: &EngineConfig) -> Self {
        Self {
            runner: ModelRunner::new(models),
            adjustments: AdjustmentEngine::new(config.adjustments.clone()),
            metrics: MetricsCalculator::new(config.metrics.clone()),
        }
    }

    /// Run the full pipeline for one property.
    ///
    /// Model invocations run concurrently; the downstream stages are
    /// synchronous pure functions over the joined results.
    pub async fn appraise(
        &self,
        subject: &PropertyFeatures,
        comps: &[ComparableSale],
        market: &MarketData,
    ) -> Result<ValuationReport, ValuationError> {
        info!(subject = %subject, models = self.runner.model_count(), "Valuation started");

        let results = self.runner.run_all(subject, comps, market).await?;
        let valuation = ensemble::combine(&results)?;
        let intervals =
            interval::confidence_intervals(&valuation.raw_values(), valuation.estimated_value);
        let adjustments = self.adjustments.evaluate(subject, valuation.estimated_value);
        let metrics = self
            .metrics
            .derive(adjustments.adjusted_value, market.average_monthly_rent);

        info!(
            estimate = %valuation.estimated_value,
            adjusted = %adjustments.adjusted_value,
            confidence = valuation.confidence_score,
            "Valuation complete"
        );

        Ok(ValuationReport {
            valuation,
            intervals,
            adjustments,
            metrics,
            generated_at: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
