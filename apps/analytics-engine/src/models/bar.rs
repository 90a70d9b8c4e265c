//! OHLCV bar types and data-quality validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of instrument a cached series belongs to.
///
/// Persisted alongside every cache row so that index and stock series for
/// the same numeric code never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Single-name equity series.
    Stock,
    /// Index series.
    Index,
}

impl DataType {
    /// Stable string form used as the storage discriminator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Index => "index",
        }
    }

    /// Parse the storage discriminator back into a tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "stock" => Some(Self::Stock),
            "index" => Some(Self::Index),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data-quality issue detected on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarIssue {
    /// One of open/high/low/close is zero or negative.
    NonPositivePrice,
    /// High is below low.
    HighBelowLow,
    /// Open falls outside the [low, high] range.
    OpenOutsideRange,
    /// Close falls outside the [low, high] range.
    CloseOutsideRange,
    /// Volume is negative.
    NegativeVolume,
}

impl std::fmt::Display for BarIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositivePrice => write!(f, "NON_POSITIVE_PRICE"),
            Self::HighBelowLow => write!(f, "HIGH_BELOW_LOW"),
            Self::OpenOutsideRange => write!(f, "OPEN_OUTSIDE_RANGE"),
            Self::CloseOutsideRange => write!(f, "CLOSE_OUTSIDE_RANGE"),
            Self::NegativeVolume => write!(f, "NEGATIVE_VOLUME"),
        }
    }
}

/// One daily OHLCV observation for a symbol.
///
/// Immutable once produced; uniquely identified by
/// (symbol, data type, source, trade date). Re-fetching the same key
/// supersedes the row via upsert rather than mutating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Instrument symbol (e.g. "000300.SH").
    pub symbol: String,
    /// Calendar trade date, no time component.
    pub trade_date: NaiveDate,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Traded volume in shares/contracts.
    pub volume: i64,
    /// Traded value.
    pub turnover: Decimal,
    /// Originating source identifier (e.g. "CACHE", a provider name).
    pub source: String,
}

impl Bar {
    /// Validate OHLC consistency for this bar.
    ///
    /// Returns the first issue found: non-positive prices, inverted
    /// high/low, open/close outside the [low, high] range, or negative
    /// volume. Rows that fail validation are skipped by the cache writer.
    pub fn validate(&self) -> Result<(), BarIssue> {
        if self.open <= Decimal::ZERO
            || self.high <= Decimal::ZERO
            || self.low <= Decimal::ZERO
            || self.close <= Decimal::ZERO
        {
            return Err(BarIssue::NonPositivePrice);
        }
        if self.high < self.low {
            return Err(BarIssue::HighBelowLow);
        }
        if self.open < self.low || self.open > self.high {
            return Err(BarIssue::OpenOutsideRange);
        }
        if self.close < self.low || self.close > self.high {
            return Err(BarIssue::CloseOutsideRange);
        }
        if self.volume < 0 {
            return Err(BarIssue::NegativeVolume);
        }
        Ok(())
    }
}
