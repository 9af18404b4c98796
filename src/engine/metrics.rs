//! Investment metrics.
//!
//! Derives yield, cap rate, cash flow, ROI, and payback period from the
//! adjusted valuation and market rent. Every ratio guards its
//! denominator and returns zero rather than dividing by zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::config::MetricsConfig;
use crate::stats::f64_to_decimal;
use crate::types::InvestmentMetrics;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Derives investment metrics from a valuation and market rent.
pub struct MetricsCalculator {
    config: MetricsConfig,
}

impl MetricsCalculator {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Access the metrics configuration.
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Compute all metrics for the given (post-adjustment) value.
    pub fn derive(
        &self,
        estimated_value: Decimal,
        average_monthly_rent: Decimal,
    ) -> InvestmentMetrics {
        let annual_cash_flow = average_monthly_rent * MONTHS_PER_YEAR;

        let gross_yield = if estimated_value > Decimal::ZERO {
            annual_cash_flow / estimated_value * PERCENT
        } else {
            Decimal::ZERO
        };

        let net_yield = gross_yield * f64_to_decimal(1.0 - self.config.expense_ratio);

        // Cap rate intentionally shares the gross-yield formula; the two
        // are reported as separate fields.
        let cap_rate = gross_yield;

        let invested = estimated_value * f64_to_decimal(self.config.acquisition_cost_multiplier);
        let roi = if invested > Decimal::ZERO {
            annual_cash_flow / invested * PERCENT
        } else {
            Decimal::ZERO
        };

        let payback_period_years = if annual_cash_flow > Decimal::ZERO {
            estimated_value / annual_cash_flow
        } else {
            Decimal::ZERO
        };

        debug!(
            value = %estimated_value,
            gross = %gross_yield,
            roi = %roi,
            payback = %payback_period_years,
            "Investment metrics derived"
        );

        InvestmentMetrics {
            estimated_value,
            average_monthly_rent,
            gross_yield,
            net_yield,
            cap_rate,
            annual_cash_flow,
            roi,
            payback_period_years,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
