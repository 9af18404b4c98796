//! Valuation model capabilities.
//!
//! Defines the `ValuationModel` trait and provides the reference
//! implementations (comparable-sales, hedonic, income) plus the
//! registry that builds the active model set from configuration.

pub mod comparable;
pub mod hedonic;
pub mod income;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ModelsConfig;
use crate::types::{ComparableSale, MarketData, ModelEstimate, PropertyFeatures, ValuationError};

/// Abstraction over property valuation models.
///
/// Implementors produce an independent point estimate of market value
/// with a self-reported confidence. The registered `accuracy` is static
/// metadata used for ensemble weighting; it is not derived per request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ValuationModel: Send + Sync {
    /// Estimate the market value of the subject property.
    async fn estimate(
        &self,
        subject: &PropertyFeatures,
        comps: &[ComparableSale],
        market: &MarketData,
    ) -> Result<ModelEstimate, ValuationError>;

    /// Model identifier string.
    fn name(&self) -> &str;

    /// Registered historical accuracy, in (0, 1].
    fn accuracy(&self) -> f64;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The set of models participating in a valuation, built from config.
pub struct ModelRegistry {
    models: Vec<Arc<dyn ValuationModel>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}

impl ModelRegistry {
    /// Build the registry from configuration.
    ///
    /// Fails when an enabled model's accuracy is outside (0, 1] or when
    /// fewer than two models are enabled — a single-model ensemble can
    /// never satisfy the pipeline's minimum.
    pub fn from_config(config: &ModelsConfig) -> Result<Self, ValuationError> {
        let mut models: Vec<Arc<dyn ValuationModel>> = Vec::new();

        if config.comparable.enabled {
            Self::check_accuracy("comparable_sales", config.comparable.accuracy)?;
            models.push(Arc::new(comparable::ComparableSalesModel::new(
                config.comparable.accuracy,
            )));
        }
        if config.hedonic.enabled {
            Self::check_accuracy("hedonic", config.hedonic.accuracy)?;
            models.push(Arc::new(hedonic::HedonicModel::new(config.hedonic.accuracy)));
        }
        if config.income.enabled {
            Self::check_accuracy("income", config.income.accuracy)?;
            models.push(Arc::new(income::IncomeModel::new(config.income.accuracy)));
        }

        if models.len() < 2 {
            return Err(ValuationError::Config(format!(
                "at least two models must be enabled, got {}",
                models.len()
            )));
        }

        Ok(Self { models })
    }

    fn check_accuracy(name: &str, accuracy: f64) -> Result<(), ValuationError> {
        if accuracy <= 0.0 || accuracy > 1.0 {
            return Err(ValuationError::Config(format!(
                "model {name} accuracy must be in (0, 1], got {accuracy}"
            )));
        }
        Ok(())
    }

    /// The registered models.
    pub fn models(&self) -> &[Arc<dyn ValuationModel>] {
        &self.models
    }

    /// Consume the registry, yielding the model list.
    pub fn into_models(self) -> Vec<Arc<dyn ValuationModel>> {
        self.models
    }

    /// Names of all registered models.
    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
