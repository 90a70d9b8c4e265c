//! Trading-calendar collaborator interface.
//!
//! The real calendar (exchange holiday tables) lives outside this crate.
//! The core only depends on the [`TradingCalendar`] trait and ships a
//! Mon-Fri [`WeekdayCalendar`] that doubles as the logged fallback when the
//! external calendar is unavailable.

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;

/// Market whose calendar governs a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    /// Mainland China (SSE/SZSE).
    Cn,
    /// United States.
    Us,
    /// Hong Kong.
    Hk,
}

impl Market {
    /// Infer the market from the symbol's shape.
    ///
    /// `*.SH`/`*.SZ` suffixes map to mainland China, an `HK.` prefix to
    /// Hong Kong; everything else defaults to the US market.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Self {
        if symbol.ends_with(".SH") || symbol.ends_with(".SZ") {
            Self::Cn
        } else if symbol.starts_with("HK.") {
            Self::Hk
        } else {
            Self::Us
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cn => write!(f, "CN"),
            Self::Us => write!(f, "US"),
            Self::Hk => write!(f, "HK"),
        }
    }
}

/// Error from a trading-calendar collaborator.
#[derive(Debug, Clone, Error)]
pub enum CalendarError {
    /// The calendar source could not be reached or has no data for the
    /// requested range.
    #[error("trading calendar unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Source of expected trading dates for a market.
pub trait TradingCalendar: Send + Sync {
    /// All trading dates in `[start, end]` (inclusive), ascending.
    fn trading_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        market: Market,
    ) -> Result<Vec<NaiveDate>, CalendarError>;
}

/// Mon-Fri business-day calendar, ignoring exchange holidays.
///
/// Used directly in tests and as the fallback when the external calendar
/// fails; the fallback path is logged by the gap resolver, never silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekdayCalendar;

impl TradingCalendar for WeekdayCalendar {
    fn trading_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        _market: Market,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        Ok(weekdays_in_range(start, end))
    }
}

/// All Mon-Fri dates in `[start, end]`, ascending.
#[must_use]
pub fn weekdays_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn market_from_symbol() {
        assert_eq!(Market::from_symbol("000300.SH"), Market::Cn);
        assert_eq!(Market::from_symbol("399001.SZ"), Market::Cn);
        assert_eq!(Market::from_symbol("HK.00700"), Market::Hk);
        assert_eq!(Market::from_symbol("AAPL"), Market::Us);
    }

    #[test]
    fn weekday_calendar_skips_weekends() {
        // 2024-01-01 is a Monday; the range covers one full week.
        let days = WeekdayCalendar
            .trading_days(date(2024, 1, 1), date(2024, 1, 7), Market::Us)
            .unwrap();
        assert_eq!(
            days,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 2),
                date(2024, 1, 3),
                date(2024, 1, 4),
                date(2024, 1, 5),
            ]
        );
    }

    #[test]
    fn weekday_range_single_saturday_is_empty() {
        let days = weekdays_in_range(date(2024, 1, 6), date(2024, 1, 6));
        assert!(days.is_empty());
    }

    #[test]
    fn weekday_range_inclusive_of_both_ends() {
        let days = weekdays_in_range(date(2024, 1, 2), date(2024, 1, 2));
        assert_eq!(days, vec![date(2024, 1, 2)]);
    }
}
