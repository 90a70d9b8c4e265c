//! Missing-date-range computation over trading calendars.
//!
//! Given the set of already-cached dates for a series, the resolver
//! computes the minimal list of contiguous sub-ranges that still need to be
//! fetched. Nearby missing dates are coalesced into one range so a single
//! provider request can span weekends and holidays.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::calendar::{Market, TradingCalendar, weekdays_in_range};

/// Default coalescing tolerance in calendar days. Seven days spans a
/// weekend plus a long exchange holiday (e.g. golden week) without
/// splitting one logical gap into many fetches.
pub const DEFAULT_GAP_TOLERANCE_DAYS: i64 = 7;

/// Computes missing date ranges for a cached series.
pub struct GapResolver {
    calendar: Arc<dyn TradingCalendar>,
    tolerance_days: i64,
}

impl GapResolver {
    /// Create a resolver over the given calendar with the default
    /// coalescing tolerance.
    #[must_use]
    pub fn new(calendar: Arc<dyn TradingCalendar>) -> Self {
        Self::with_tolerance(calendar, DEFAULT_GAP_TOLERANCE_DAYS)
    }

    /// Create a resolver with an explicit coalescing tolerance.
    #[must_use]
    pub fn with_tolerance(calendar: Arc<dyn TradingCalendar>, tolerance_days: i64) -> Self {
        Self {
            calendar,
            tolerance_days,
        }
    }

    /// Compute the missing contiguous date ranges in `[start, end]`.
    ///
    /// - Empty cache: the whole request is one gap.
    /// - Full coverage of the market's expected trading dates: no gaps.
    /// - Otherwise: expected-minus-cached dates, coalesced left to right;
    ///   successive missing dates at most `tolerance_days` apart
    ///   (inclusive) fall into the same range.
    ///
    /// If the calendar collaborator fails, the resolver falls back to
    /// Mon-Fri business days and logs the degradation.
    #[must_use]
    pub fn missing_ranges(
        &self,
        cached_dates: &BTreeSet<NaiveDate>,
        start: NaiveDate,
        end: NaiveDate,
        market: Market,
    ) -> Vec<(NaiveDate, NaiveDate)> {
        if cached_dates.is_empty() {
            return vec![(start, end)];
        }

        let expected = match self.calendar.trading_days(start, end, market) {
            Ok(days) => days,
            Err(err) => {
                warn!(
                    %market,
                    %start,
                    %end,
                    error = %err,
                    "trading calendar unavailable, falling back to Mon-Fri business days"
                );
                weekdays_in_range(start, end)
            }
        };

        let missing: Vec<NaiveDate> = expected
            .into_iter()
            .filter(|d| !cached_dates.contains(d))
            .collect();

        if missing.is_empty() {
            debug!(%start, %end, "cache fully covers requested range");
            return Vec::new();
        }

        self.coalesce(&missing)
    }

    /// Merge sorted missing dates into ranges with a single linear scan.
    fn coalesce(&self, missing: &[NaiveDate]) -> Vec<(NaiveDate, NaiveDate)> {
        let mut ranges = Vec::new();
        let mut range_start = missing[0];
        let mut range_end = missing[0];

        for &day in &missing[1..] {
            if day.signed_duration_since(range_end).num_days() <= self.tolerance_days {
                range_end = day;
            } else {
                ranges.push((range_start, range_end));
                range_start = day;
                range_end = day;
            }
        }
        ranges.push((range_start, range_end));

        debug!(
            missing_dates = missing.len(),
            ranges = ranges.len(),
            "coalesced missing dates into fetch ranges"
        );
        ranges
    }
}
