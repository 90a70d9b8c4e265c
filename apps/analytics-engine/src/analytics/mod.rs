//! Backtest analytics: derived daily series, FIFO trade pairing, and
//! aggregate summary statistics.
//!
//! Control flow for a results request: the daily results run through
//! [`process_daily_results`], the raw trades through [`pair_trades`], and
//! [`summarize`] folds both into a [`SummaryStatistics`].

pub mod constants;
pub mod daily;
pub mod math;
pub mod pairing;
pub mod statistics;

use rust_decimal::Decimal;
use thiserror::Error;

pub use daily::{DailyRecord, process_daily_results};
pub use pairing::{TradePair, pair_trades};
pub use statistics::{SummaryStatistics, summarize};

use crate::models::{DailyResult, Trade};

/// Errors from statistics derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// Initial capital must be strictly positive; ratios divide by it.
    #[error("initial capital must be positive, got {0}")]
    InvalidInitialCapital(Decimal),
}

/// Derive the daily series and summary statistics in one call.
///
/// Convenience wrapper over [`process_daily_results`] + [`summarize`] for
/// callers that want both the per-day records and the aggregate numbers.
pub fn analyze_backtest(
    daily_results: &[DailyResult],
    trades: &[Trade],
    initial_capital: Decimal,
) -> Result<(Vec<DailyRecord>, SummaryStatistics), StatsError> {
    let records = process_daily_results(daily_results, initial_capital)?;
    let stats = summarize(&records, trades, initial_capital)?;
    Ok((records, stats))
}
