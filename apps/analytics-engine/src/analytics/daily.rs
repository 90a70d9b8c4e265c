//! Derivation of the per-day performance series.
//!
//! A single forward pass over the engine's daily results produces the
//! running figures every consumer reads: cumulative PnL, return ratio,
//! drawdown from the running equity peak, and the win/loss-day ratio. The
//! fields are cumulative by design — the last record carries the
//! "as-of-now" totals.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::StatsError;
use super::constants::{HUNDRED, LOSS_THRESHOLD, PROFIT_THRESHOLD};
use crate::models::DailyResult;

/// One day of derived performance figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Trading date.
    pub date: NaiveDate,
    /// Net PnL for this day.
    pub net_pnl: Decimal,
    /// Cumulative PnL from the start of the series.
    pub total_pnl: Decimal,
    /// Cumulative return as a percentage of initial capital.
    pub return_ratio: Decimal,
    /// Running winning-days / losing-days ratio.
    pub win_loss_ratio: Decimal,
    /// Drawdown from the running equity peak, percent. Zero at a new peak.
    pub drawdown: Decimal,
    /// Largest drawdown seen so far, percent.
    pub max_drawdown: Decimal,
}

/// Derive the per-day performance series from ordered daily results.
///
/// Runs in one O(n) pass. Days within ±0.01 of zero are neutral: they
/// count as neither winning nor losing. The win/loss ratio degrades
/// gracefully when no losing day has occurred yet (the win count itself,
/// or zero before the first classified day).
///
/// Empty input produces empty output; callers special-case zero-length
/// series. `initial_capital` must be positive.
pub fn process_daily_results(
    results: &[DailyResult],
    initial_capital: Decimal,
) -> Result<Vec<DailyRecord>, StatsError> {
    if initial_capital <= Decimal::ZERO {
        return Err(StatsError::InvalidInitialCapital(initial_capital));
    }

    let mut records = Vec::with_capacity(results.len());
    let mut cumulative_pnl = Decimal::ZERO;
    let mut win_count = 0u64;
    let mut loss_count = 0u64;
    let mut max_capital = initial_capital;
    let mut max_drawdown = Decimal::ZERO;

    for result in results {
        cumulative_pnl += result.net_pnl;
        let current_capital = initial_capital + cumulative_pnl;

        let drawdown = if current_capital > max_capital {
            max_capital = current_capital;
            Decimal::ZERO
        } else {
            let drawdown = (max_capital - current_capital) / max_capital * HUNDRED;
            max_drawdown = max_drawdown.max(drawdown);
            drawdown
        };

        if result.net_pnl > PROFIT_THRESHOLD {
            win_count += 1;
        } else if result.net_pnl < LOSS_THRESHOLD {
            loss_count += 1;
        }

        let win_loss_ratio = if loss_count > 0 {
            Decimal::from(win_count) / Decimal::from(loss_count)
        } else if win_count > 0 {
            Decimal::from(win_count)
        } else {
            Decimal::ZERO
        };

        records.push(DailyRecord {
            date: result.date,
            net_pnl: result.net_pnl,
            total_pnl: cumulative_pnl,
            return_ratio: cumulative_pnl / initial_capital * HUNDRED,
            win_loss_ratio,
            drawdown,
            max_drawdown,
        });
    }

    Ok(records)
}
