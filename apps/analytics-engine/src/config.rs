//! Configuration for the market-data and analytics layers.
//!
//! Plain serde structs with field defaults; the hosting service decides
//! where the values come from (file, environment, hardcoded test config).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::marketdata::gaps::DEFAULT_GAP_TOLERANCE_DAYS;

/// One configured data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider name; must match the adapter's reported name.
    pub name: String,
    /// Whether the provider participates in fetches.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Fetch priority; lower numbers are tried first.
    #[serde(default = "default_priority")]
    pub priority: u32,
}

/// Market-data service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataServiceConfig {
    /// Path of the SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Gap-coalescing tolerance in calendar days.
    #[serde(default = "default_gap_tolerance_days")]
    pub gap_tolerance_days: i64,
    /// Configured providers, in no particular order; priority decides.
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,
}

impl Default for DataServiceConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            gap_tolerance_days: default_gap_tolerance_days(),
            providers: Vec::new(),
        }
    }
}

/// Backtest analytics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Initial account capital; ratios and drawdowns divide by it.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

const fn default_priority() -> u32 {
    100
}

fn default_db_path() -> String {
    "market_data.db".to_string()
}

const fn default_gap_tolerance_days() -> i64 {
    DEFAULT_GAP_TOLERANCE_DAYS
}

fn default_initial_capital() -> Decimal {
    dec!(1_000_000)
}
