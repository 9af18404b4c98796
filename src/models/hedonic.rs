//! Hedonic valuation model.
//!
//! Builds the value from the market's price-per-square-foot baseline
//! plus per-attribute increments, scaled by quality multipliers and
//! age depreciation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::ValuationModel;
use crate::stats::f64_to_decimal;
use crate::types::{ComparableSale, MarketData, ModelEstimate, PropertyFeatures, ValuationError};

const MODEL_NAME: &str = "hedonic";

// Attribute increments in dollars.
const BEDROOM_VALUE: Decimal = dec!(12000);
const BATHROOM_VALUE: Decimal = dec!(9000);
const GARAGE_VALUE: Decimal = dec!(7500);
const POOL_VALUE: Decimal = dec!(15000);
const RENOVATED_KITCHEN_VALUE: Decimal = dec!(20000);
const LOT_VALUE_PER_SQFT: Decimal = dec!(2);

// Quality multiplier weights, applied to each score's distance from 0.5.
const CONDITION_WEIGHT: f64 = 0.25;
const LOCATION_WEIGHT: f64 = 0.30;
const VIEW_WEIGHT: f64 = 0.10;
const SCHOOL_WEIGHT: f64 = 0.10;

/// Linear depreciation per year of age, flat past 50 years.
const DEPRECIATION_PER_YEAR: f64 = 0.004;
const MAX_DEPRECIATED_YEARS: u32 = 50;

const CONFIDENCE: f64 = 0.85;
/// Older housing stock is harder to price from attributes alone.
const OLD_STOCK_CONFIDENCE: f64 = 0.75;
const OLD_STOCK_AGE_YEARS: u32 = 40;

pub struct HedonicModel {
    accuracy: f64,
}

impl HedonicModel {
    pub fn new(accuracy: f64) -> Self {
        Self { accuracy }
    }
}

#[async_trait]
impl ValuationModel for HedonicModel {
    async fn estimate(
        &self,
        subject: &PropertyFeatures,
        _comps: &[ComparableSale],
        market: &MarketData,
    ) -> Result<ModelEstimate, ValuationError> {
        let base = market.price_per_square_foot * f64_to_decimal(subject.square_feet);
        if base <= Decimal::ZERO {
            return Err(ValuationError::Model {
                model: MODEL_NAME.to_string(),
                message: "market price per square foot unavailable".to_string(),
            });
        }

        let mut attributes = BEDROOM_VALUE * Decimal::from(subject.bedrooms)
            + BATHROOM_VALUE * f64_to_decimal(subject.bathrooms)
            + GARAGE_VALUE * Decimal::from(subject.garage_spaces)
            + LOT_VALUE_PER_SQFT * f64_to_decimal(subject.lot_size_sqft);
        if subject.has_pool {
            attributes += POOL_VALUE;
        }
        if subject.has_renovated_kitchen {
            attributes += RENOVATED_KITCHEN_VALUE;
        }

        let quality = 1.0
            + CONDITION_WEIGHT * (subject.condition_score - 0.5)
            + LOCATION_WEIGHT * (subject.location_score - 0.5)
            + VIEW_WEIGHT * (subject.view_score - 0.5)
            + SCHOOL_WEIGHT * (subject.school_score - 0.5);

        let depreciated_years = subject.age_years.min(MAX_DEPRECIATED_YEARS);
        let depreciation = 1.0 - DEPRECIATION_PER_YEAR * depreciated_years as f64;

        let value = (base + attributes) * f64_to_decimal(quality) * f64_to_decimal(depreciation);

        let confidence = if subject.age_years > OLD_STOCK_AGE_YEARS {
            OLD_STOCK_CONFIDENCE
        } else {
            CONFIDENCE
        };

        debug!(
            base = %base,
            attributes = %attributes,
            quality,
            depreciation,
            value = %value,
            "Hedonic estimate"
        );

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
