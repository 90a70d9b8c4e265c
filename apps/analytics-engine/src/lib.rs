// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Analytics Engine - Rust Core Library
//!
//! Deterministic analytics core for trading-strategy backtests. Two
//! subsystems share this crate:
//!
//! - **Market data** (`marketdata`): a persistent OHLCV bar cache keyed by
//!   (symbol, data type, source, trade date), reconciled incrementally
//!   against a priority-ordered list of data providers. Requests compute
//!   the missing date ranges over a trading calendar, fetch only the gaps,
//!   and merge the result deterministically.
//! - **Analytics** (`analytics`): derivation of the per-day performance
//!   series (cumulative PnL, return ratio, running drawdown, win/loss-day
//!   ratio), FIFO pairing of OPEN/CLOSE executions into realized round
//!   trips, and the aggregate summary statistics (max drawdown, annualized
//!   return/volatility/Sharpe, win rate, profit factor).
//!
//! The crate has no wire surface of its own. Vendor adapters, the exchange
//! holiday calendar, and the backtest engine producing trades and daily
//! results are all injected collaborators.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Backtest analytics: daily series, trade pairing, summary statistics.
pub mod analytics;

/// Configuration types for both layers.
pub mod config;

/// Market-data layer: cache, calendar gaps, provider fetch.
pub mod marketdata;

/// Core data model shared by both layers.
pub mod models;

// Re-exports of the main entry points.
pub use analytics::{
    DailyRecord, StatsError, SummaryStatistics, TradePair, analyze_backtest,
    pair_trades, process_daily_results, summarize,
};
pub use config::{AnalyticsConfig, DataServiceConfig, ProviderSettings};
pub use marketdata::{
    BarCache, CacheError, DataServiceError, GapResolver, Market, MarketDataProvider,
    MarketDataService, ProviderError, ProviderRegistry, TradingCalendar, WeekdayCalendar,
};
pub use models::{Bar, DailyResult, DataType, Direction, Offset, Trade};
