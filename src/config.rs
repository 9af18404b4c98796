//! Engine configuration loading from TOML.
//!
//! Every tunable in the pipeline lives here: which models participate
//! and with what registered accuracy, the adjustment rule thresholds,
//! and the investment-metric constants. All sections carry defaults so
//! the engine runs without a config file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level engine configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub models: ModelsConfig,
    pub adjustments: AdjustmentConfig,
    pub metrics: MetricsConfig,
}

/// Which valuation models participate, and their registered accuracy.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelsConfig {
    pub comparable: ModelConfig,
    pub hedonic: ModelConfig,
    pub income: ModelConfig,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            comparable: ModelConfig { enabled: true, accuracy: 0.94 },
            hedonic: ModelConfig { enabled: true, accuracy: 0.89 },
            income: ModelConfig { enabled: true, accuracy: 0.92 },
        }
    }
}

/// Per-model settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub enabled: bool,
    /// Historical accuracy used for ensemble weighting, in (0, 1].
    pub accuracy: f64,
}

/// Thresholds and magnitudes for the adjustment rules.
/// Percentages are signed fractions (−0.05 = −5%).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdjustmentConfig {
    pub location_score_threshold: f64,
    pub location_percentage: f64,
    pub age_threshold_years: u32,
    pub age_percentage_per_year: f64,
    /// Floor for the age adjustment (most negative it can get).
    pub age_max_percentage: f64,
    pub condition_score_threshold: f64,
    pub condition_percentage: f64,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            location_score_threshold: 0.70,
            location_percentage: -0.05,
            age_threshold_years: 20,
            age_percentage_per_year: -0.005,
            age_max_percentage: -0.15,
            condition_score_threshold: 0.60,
            condition_percentage: -0.10,
        }
    }
}

/// Constants for investment-metric derivation.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MetricsConfig {
    /// Fraction of gross income assumed lost to operating expenses.
    pub expense_ratio: f64,
    /// Multiplier on purchase price modelling closing-cost overhead.
    pub acquisition_cost_multiplier: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            expense_ratio: 0.25,
            acquisition_cost_multiplier: 1.2,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: EngineConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }
}
