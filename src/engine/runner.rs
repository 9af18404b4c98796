//! Concurrent model invocation.
//!
//! Runs every registered model against the shared inputs as independent
//! tasks, collects usable results, and excludes failing models without
//! aborting the request — unless too few remain to ensemble.

use futures::future;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::ValuationModel;
use crate::types::{ComparableSale, MarketData, ModelResult, PropertyFeatures, ValuationError};

/// Minimum number of usable model results for a valuation to proceed.
pub const MIN_USABLE_MODELS: usize = 2;

/// Invokes all registered models concurrently.
pub struct ModelRunner {
    models: Vec<Arc<dyn ValuationModel>>,
}

impl ModelRunner {
    pub fn new(models: Vec<Arc<dyn ValuationModel>>) -> Self {
        Self { models }
    }

    /// Number of registered models.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Run every model against the shared inputs.
    ///
    /// Each model runs as its own task; a failing or panicking model is
    /// logged and excluded. Dropping the returned future discards the
    /// results of any in-flight model tasks. Fails with
    /// `InsufficientModels` when fewer than [`MIN_USABLE_MODELS`]
    /// models produce a usable result.
    pub async fn run_all(
        &self,
        subject: &PropertyFeatures,
        comps: &[ComparableSale],
        market: &MarketData,
    ) -> Result<HashMap<String, ModelResult>, ValuationError> {
        let mut tasks = Vec::with_capacity(self.models.len());
        for model in &self.models {
            let model = Arc::clone(model);
            let subject = subject.clone();
            let comps = comps.to_vec();
            let market = market.clone();
            tasks.push(tokio::spawn(async move {
                let name = model.name().to_string();
                let accuracy = model.accuracy();
                let outcome = model.estimate(&subject, &comps, &market).await;
                (name, accuracy, outcome)
            }));
        }

        let mut results = HashMap::new();
        for joined in future::join_all(tasks).await {
            match joined {
                Ok((name, accuracy, Ok(estimate))) => {
                    debug!(
                        model = %name,
                        value = %estimate.value,
                        confidence = estimate.confidence,
                        "Model estimate received"
                    );
                    results.insert(
                        name.clone(),
                        ModelResult {
                            model_name: name,
                            estimated_value: estimate.value,
                            confidence_score: estimate.confidence,
                            model_accuracy: accuracy,
                        },
                    );
                }
                Ok((name, _, Err(e))) => {
                    warn!(model = %name, error = %e, "Model failed, excluding from ensemble");
                }
                Err(e) => {
                    warn!(error = %e, "Model task aborted");
                }
            }
        }

        if results.len() < MIN_USABLE_MODELS {
            return Err(ValuationError::InsufficientModels {
                needed: MIN_USABLE_MODELS,
                available: results.len(),
            });
        }

        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
