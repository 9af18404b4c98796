//! Income-capitalization valuation model.
//!
//! Values the property as an income stream: annualized market rent
//! times a gross rent multiplier, with the multiplier shifted by
//! neighbourhood desirability.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use super::ValuationModel;
use crate::stats::f64_to_decimal;
use crate::types::{ComparableSale, MarketData, ModelEstimate, PropertyFeatures, ValuationError};

const MODEL_NAME: &str = "income";

/// Years of annual rent a buyer pays in a location-neutral market.
const BASE_GROSS_RENT_MULTIPLIER: f64 = 14.0;

/// Location shift: GRM ranges from 0.85× to 1.15× the base.
const LOCATION_SPREAD: f64 = 0.30;

const CONFIDENCE: f64 = 0.70;
/// A fast-moving market prices rental stock more reliably.
const LIQUID_MARKET_CONFIDENCE: f64 = 0.75;
const LIQUID_MARKET_MAX_DOM: u32 = 45;

pub struct IncomeModel {
    accuracy: f64,
}

impl IncomeModel {
    pub fn new(accuracy: f64) -> Self {
        Self { accuracy }
    }
}

#[async_trait]
impl ValuationModel for IncomeModel {
    async fn estimate(
        &self,
        subject: &PropertyFeatures,
        _comps: &[ComparableSale],
        market: &MarketData,
    ) -> Result<ModelEstimate, ValuationError> {
        if market.average_monthly_rent <= Decimal::ZERO {
            return Err(ValuationError::Model {
                model: MODEL_NAME.to_string(),
                message: "market rent unavailable".to_string(),
            });
        }

        let grm = BASE_GROSS_RENT_MULTIPLIER
            * (1.0 + LOCATION_SPREAD * (subject.location_score - 0.5));
        let value = market.annual_rent() * f64_to_decimal(grm);

        let confidence = if market.days_on_market <= LIQUID_MARKET_MAX_DOM {
            LIQUID_MARKET_CONFIDENCE
        } else {
            CONFIDENCE
        };

        debug!(grm, value = %value, confidence, "Income estimate");

        Ok(ModelEstimate { value, confidence })
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn accuracy(&self) -> f64 {
        self.accuracy
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
