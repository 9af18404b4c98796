//! Comparable-sales valuation model.
//!
//! Prices the subject from the median price per square foot of nearby
//! recent sales, time-adjusted for market appreciation. Confidence
//! grows with the number of usable comps.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use super::ValuationModel;
use crate::stats::f64_to_decimal;
use crate::types::{ComparableSale, MarketData, ModelEstimate, PropertyFeatures, ValuationError};

const MODEL_NAME: &str = "comparable_sales";

/// Comps farther than this are not representative of the subject's area.
const MAX_COMP_DISTANCE_MILES: f64 = 5.0;

const BASE_CONFIDENCE: f64 = 0.50;
const CONFIDENCE_PER_COMP: f64 = 0.08;
const MAX_CONFIDENCE: f64 = 0.90;

/// Premium/discount per point of condition and location above the
/// comp-pool baseline of 0.5.
const CONDITION_WEIGHT: f64 = 0.10;
const LOCATION_WEIGHT: f64 = 0.10;

pub struct ComparableSalesModel {
    accuracy: f64,
}

impl ComparableSalesModel {
    pub fn new(accuracy: f64) -> Self {
        Self { accuracy }
    }

    /// Scale a comp's price per square foot to today using the market's
    /// annual appreciation rate.
    fn time_adjusted_ppsf(comp: &ComparableSale, market: &MarketData) -> Option<Decimal> {
        let ppsf = comp.price_per_square_foot()?;
        let growth =
            1.0 + (market.annual_appreciation_pct / 100.0) * (comp.months_since_sale as f64 / 12.0);
        Some(ppsf * f64_to_decimal(growth))
    }
}

#[async_trait]
impl ValuationModel for ComparableSalesModel {
    async fn estimate(
        &self,
        subject: &PropertyFeatures,
        comps: &[ComparableSale],
        market: &MarketData,
    ) -> Result<ModelEstimate, ValuationError> {
        let mut ppsf: Vec<Decimal> = comps
            .iter()
            .filter(|c| c.distance_miles <= MAX_COMP_DISTANCE_MILES)
            .filter_map(|c| Self::time_adjusted_ppsf(c, market))
            .collect();

        if ppsf.is_empty() {
            return Err(ValuationError::Model {
                model: MODEL_NAME.to_string(),
                message: "no usable comparable sales".to_string(),
            });
        }

        ppsf.sort();
        let median = if ppsf.len() % 2 == 0 {
            let mid = ppsf.len() / 2;
            (ppsf[mid - 1] + ppsf[mid]) / Decimal::from(2)
        } else {
            ppsf[ppsf.len() / 2]
        };

        let base = median * f64_to_decimal(subject.square_feet);
        let premium = 1.0
            + CONDITION_WEIGHT * (subject.condition_score - 0.5)
            + LOCATION_WEIGHT * (subject.location_score - 0.5);
        let value = base * f64_to_decimal(premium);

        let confidence =
            (BASE_CONFIDENCE + CONFIDENCE_PER_COMP * ppsf.len() as f64).min(MAX_CONFIDENCE);

        debug!(
            comps = ppsf.len(),
            median_ppsf = %median,
            value = %value,
            confidence,
            "Comparable-sales estimate"
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
