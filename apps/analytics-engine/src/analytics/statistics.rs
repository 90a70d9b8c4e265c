//! Summary statistics over the derived daily series and raw trades.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StatsError;
use super::constants::{HUNDRED, TRADING_DAYS};
use super::daily::DailyRecord;
use super::math::{mean, population_std_dev, sqrt_decimal};
use super::pairing::pair_trades;
use crate::models::Trade;

/// Aggregate performance statistics for one backtest run.
///
/// Computed fresh on every request from the derived daily series and the
/// raw trade list; never persisted by this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Cumulative return, percent of initial capital.
    pub total_return: Decimal,
    /// Annualized return, percent (mean daily return x 252).
    pub annual_return: Decimal,
    /// Maximum drawdown from the equity curve, percent.
    pub max_drawdown: Decimal,
    /// Annualized volatility, percent (population stdev x sqrt(252)).
    pub annual_volatility: Decimal,
    /// Annualized Sharpe ratio; zero when volatility is zero.
    pub sharpe_ratio: Decimal,
    /// Count of ALL raw trades, not just completed round trips.
    pub total_trades: u64,
    /// Winning round trips over all round trips, percent.
    pub win_rate: Decimal,
    /// Gross profit over absolute gross loss; zero when there are no
    /// losing round trips.
    pub profit_factor: Decimal,
    /// Cumulative net PnL.
    pub total_pnl: Decimal,
    /// Largest single round-trip profit.
    pub max_profit: Decimal,
    /// Largest single round-trip loss (negative or zero).
    pub max_loss: Decimal,
    /// Final winning-days / losing-days ratio.
    pub final_win_loss_ratio: Decimal,
}

impl SummaryStatistics {
    /// Serialize to pretty JSON for report export.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Compute summary statistics from the derived daily series plus raw
/// trades.
///
/// Without a daily series there is no equity curve, so an empty `daily`
/// slice yields a zeroed [`SummaryStatistics`] rather than an error.
/// `initial_capital` must be positive.
pub fn summarize(
    daily: &[DailyRecord],
    trades: &[Trade],
    initial_capital: Decimal,
) -> Result<SummaryStatistics, StatsError> {
    if initial_capital <= Decimal::ZERO {
        return Err(StatsError::InvalidInitialCapital(initial_capital));
    }

    let Some(last) = daily.last() else {
        debug!("empty daily series, returning zeroed statistics");
        return Ok(SummaryStatistics::default());
    };

    let max_drawdown = max_drawdown_pct(daily, initial_capital);
    let (annual_return, annual_volatility, sharpe_ratio) =
        annualized_metrics(daily, initial_capital);
    let trade_stats = trade_statistics(trades);

    Ok(SummaryStatistics {
        total_return: last.return_ratio,
        annual_return,
        max_drawdown,
        annual_volatility,
        sharpe_ratio,
        total_trades: trade_stats.total_trades,
        win_rate: trade_stats.win_rate,
        profit_factor: trade_stats.profit_factor,
        total_pnl: last.total_pnl,
        max_profit: trade_stats.max_profit,
        max_loss: trade_stats.max_loss,
        final_win_loss_ratio: last.win_loss_ratio,
    })
}

/// Canonical maximum drawdown: an independent running-maximum scan over
/// the full equity curve, seeded at initial capital so a first-day loss
/// already counts as a drawdown. The per-step `max_drawdown` field on
/// [`DailyRecord`] is derived the same way; a test asserts the two agree.
fn max_drawdown_pct(daily: &[DailyRecord], initial_capital: Decimal) -> Decimal {
    let mut peak = initial_capital;
    let mut max_drawdown = Decimal::ZERO;

    for record in daily {
        let equity = initial_capital + record.total_pnl;
        if equity > peak {
            peak = equity;
        } else if peak > Decimal::ZERO {
            let drawdown = (peak - equity) / peak * HUNDRED;
            max_drawdown = max_drawdown.max(drawdown);
        }
    }

    max_drawdown
}

/// Annualized return, volatility, and Sharpe ratio from day-over-day
/// equity deltas. A series with no deltas (zero or one day) has no return
/// distribution, so all three come back zero.
fn annualized_metrics(
    daily: &[DailyRecord],
    initial_capital: Decimal,
) -> (Decimal, Decimal, Decimal) {
    let daily_returns: Vec<Decimal> = daily
        .windows(2)
        .map(|w| (w[1].total_pnl - w[0].total_pnl) / initial_capital)
        .collect();

    if daily_returns.is_empty() {
        return (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    }

    let avg = mean(&daily_returns).unwrap_or(Decimal::ZERO);
    let std = population_std_dev(&daily_returns).unwrap_or(Decimal::ZERO);
    let sqrt_days = sqrt_decimal(TRADING_DAYS).unwrap_or(Decimal::ZERO);

    let annual_return = avg * TRADING_DAYS * HUNDRED;
    let annual_volatility = std * sqrt_days * HUNDRED;
    let sharpe_ratio = if std > Decimal::ZERO {
        (avg * TRADING_DAYS) / (std * sqrt_days)
    } else {
        Decimal::ZERO
    };

    (annual_return, annual_volatility, sharpe_ratio)
}

struct TradeStats {
    total_trades: u64,
    win_rate: Decimal,
    profit_factor: Decimal,
    max_profit: Decimal,
    max_loss: Decimal,
}

/// Trade-level statistics over FIFO round trips. `total_trades` counts
/// every raw execution, which intentionally differs from the number of
/// completed round trips.
fn trade_statistics(trades: &[Trade]) -> TradeStats {
    let total_trades = trades.len() as u64;
    let pairs = pair_trades(trades);

    if pairs.is_empty() {
        return TradeStats {
            total_trades,
            win_rate: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
            max_profit: Decimal::ZERO,
            max_loss: Decimal::ZERO,
        };
    }

    let winning = pairs.iter().filter(|p| p.is_winner()).count() as u64;
    let win_rate = Decimal::from(winning) / Decimal::from(pairs.len() as u64) * HUNDRED;

    let gross_profit: Decimal = pairs
        .iter()
        .filter(|p| p.pnl > Decimal::ZERO)
        .map(|p| p.pnl)
        .sum();
    let gross_loss: Decimal = pairs
        .iter()
        .filter(|p| p.pnl < Decimal::ZERO)
        .map(|p| p.pnl)
        .sum::<Decimal>()
        .abs();
    let profit_factor = if gross_loss > Decimal::ZERO {
        gross_profit / gross_loss
    } else {
        Decimal::ZERO
    };

    let max_profit = pairs.iter().map(|p| p.pnl).max().unwrap_or(Decimal::ZERO);
    let max_loss = pairs.iter().map(|p| p.pnl).min().unwrap_or(Decimal::ZERO);

    TradeStats {
        total_trades,
        win_rate,
        profit_factor,
        max_profit,
        max_loss,
    }
}
