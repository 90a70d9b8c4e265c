//! Trade execution records and the direction/offset parse boundary.
//!
//! Backtest engines report direction and offset as free-form strings
//! (`"LONG"`, `"Direction.SHORT"`, `"Offset.OPEN"`, ...). Those strings are
//! parsed into tagged enums exactly once, here; downstream code never
//! re-inspects strings.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Long position.
    Long,
    /// Short position.
    Short,
}

/// Whether a trade opens or closes a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Offset {
    /// Opening leg.
    Open,
    /// Closing leg.
    Close,
}

/// Error parsing a raw direction/offset field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {field} value: '{value}'")]
pub struct ParseTradeFieldError {
    /// Which field failed to parse ("direction" or "offset").
    pub field: &'static str,
    /// The offending raw value.
    pub value: String,
}

impl FromStr for Direction {
    type Err = ParseTradeFieldError;

    /// Accepts the machine form (`"LONG"`) and the qualified engine form
    /// (`"Direction.LONG"`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if upper.contains("LONG") {
            Ok(Self::Long)
        } else if upper.contains("SHORT") {
            Ok(Self::Short)
        } else {
            Err(ParseTradeFieldError {
                field: "direction",
                value: s.to_string(),
            })
        }
    }
}

impl FromStr for Offset {
    type Err = ParseTradeFieldError;

    /// Accepts the machine form (`"OPEN"`) and the qualified engine form
    /// (`"Offset.CLOSE"`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if upper.contains("OPEN") {
            Ok(Self::Open)
        } else if upper.contains("CLOSE") {
            Ok(Self::Close)
        } else {
            Err(ParseTradeFieldError {
                field: "offset",
                value: s.to_string(),
            })
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

impl std::fmt::Display for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Close => write!(f, "CLOSE"),
        }
    }
}

/// One trade execution reported by the backtest engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution timestamp.
    pub timestamp: NaiveDateTime,
    /// Instrument symbol.
    pub symbol: String,
    /// Position direction.
    pub direction: Direction,
    /// Open/close flag.
    pub offset: Offset,
    /// Execution price.
    pub price: Decimal,
    /// Executed volume.
    pub volume: i64,
    /// Caller-supplied realized PnL. Often zero; the pairing engine
    /// recomputes realized PnL from matched legs.
    #[serde(default)]
    pub pnl: Decimal,
    /// Commission charged for this execution.
    #[serde(default)]
    pub commission: Decimal,
}

impl Trade {
    /// Build a trade from raw engine fields, parsing direction and offset
    /// at this boundary.
    pub fn from_raw(
        timestamp: NaiveDateTime,
        symbol: impl Into<String>,
        direction: &str,
        offset: &str,
        price: Decimal,
        volume: i64,
    ) -> Result<Self, ParseTradeFieldError> {
        Ok(Self {
            timestamp,
            symbol: symbol.into(),
            direction: direction.parse()?,
            offset: offset.parse()?,
            price,
            volume,
            pnl: Decimal::ZERO,
            commission: Decimal::ZERO,
        })
    }
}
