//! Daily account snapshot produced by the backtest engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trading day's account result.
///
/// The sequence consumed by the analytics layer must be ordered by strictly
/// increasing date; calendar completeness is not required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyResult {
    /// Trading date.
    pub date: NaiveDate,
    /// Net PnL for the day, after commission. May be negative.
    pub net_pnl: Decimal,
    /// Raw PnL before commission, when the engine reports it.
    #[serde(default)]
    pub raw_pnl: Option<Decimal>,
}

impl DailyResult {
    /// Convenience constructor for a net-only result.
    #[must_use]
    pub const fn new(date: NaiveDate, net_pnl: Decimal) -> Self {
        Self {
            date,
            net_pnl,
            raw_pnl: None,
        }
    }
}
