//! Cache-first market-data retrieval.
//!
//! A request reads the cache, resolves the missing date ranges, fetches
//! only those ranges through the provider registry in priority order,
//! upserts the fetched bars tagged with the winning provider, and returns
//! the merged series. Total provider failure degrades to whatever the
//! cache already holds.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cache::{BarCache, CacheError};
use super::calendar::Market;
use super::gaps::GapResolver;
use super::provider::ProviderRegistry;
use crate::models::Bar;

/// Errors from the market-data service.
///
/// Provider failures never surface here; they are absorbed by the fetch
/// loop and reported as partial (or empty) data.
#[derive(Debug, Error)]
pub enum DataServiceError {
    /// The local cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Cache-reconciling facade over the bar cache, gap resolver, and
/// provider registry. All collaborators are injected; the service owns no
/// global state.
pub struct MarketDataService {
    cache: BarCache,
    registry: ProviderRegistry,
    gaps: GapResolver,
}

impl MarketDataService {
    /// Build a service from its collaborators.
    #[must_use]
    pub fn new(cache: BarCache, registry: ProviderRegistry, gaps: GapResolver) -> Self {
        Self {
            cache,
            registry,
            gaps,
        }
    }

    /// Access the underlying cache (summaries, explicit clears).
    #[must_use]
    pub const fn cache(&self) -> &BarCache {
        &self.cache
    }

    /// Daily bars for `symbol` in `[start, end]`, reconciling the cache
    /// against the configured providers.
    ///
    /// Only the missing date ranges are fetched remotely. When every
    /// provider fails for a gap, the already-cached partial series is
    /// returned rather than an error.
    pub fn get_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataServiceError> {
        let cached = self.cache.read_range(symbol, start, end)?;
        let cached_dates: BTreeSet<NaiveDate> = cached.iter().map(|b| b.trade_date).collect();
        let market = Market::from_symbol(symbol);

        let gaps = self.gaps.missing_ranges(&cached_dates, start, end, market);
        if gaps.is_empty() {
            info!(symbol, rows = cached.len(), "served fully from cache");
            return Ok(cached);
        }

        info!(
            symbol,
            cached_rows = cached.len(),
            gap_ranges = gaps.len(),
            "cache incomplete, fetching missing ranges"
        );

        let mut merged = cached;
        for (gap_start, gap_end) in gaps {
            match self.fetch_range(symbol, gap_start, gap_end) {
                Some(bars) => merged.extend(bars),
                None => warn!(
                    symbol,
                    start = %gap_start,
                    end = %gap_end,
                    "no provider produced data for gap, returning partial series"
                ),
            }
        }

        merged.sort_by_key(|b| b.trade_date);
        Ok(merged)
    }

    /// Fetch `[start, end]` from the first supporting provider that
    /// returns data, in ascending priority order.
    ///
    /// Unsupported symbols are skipped outright. A provider error or empty
    /// result is logged and the next provider is tried; the first
    /// non-empty result is upserted to the cache under the provider's name
    /// and returned. `None` means every candidate failed or came back
    /// empty — callers treat "no data" and "error" identically.
    pub fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Option<Vec<Bar>> {
        let providers = self.registry.providers_for_symbol(symbol);
        if providers.is_empty() {
            warn!(symbol, "no configured provider supports symbol");
            return None;
        }

        for provider in providers {
            let name = provider.name().to_string();
            match provider.historical_data(symbol, start, end) {
                Ok(bars) if bars.is_empty() => {
                    debug!(provider = %name, symbol, "provider returned no data, trying next");
                }
                Ok(bars) => {
                    let data_type = provider.data_type(symbol);
                    match self.cache.write_bars(symbol, &bars, data_type, &name) {
                        Ok(written) => debug!(provider = %name, symbol, written, "bars cached"),
                        // Fetched data is still returned even if caching it failed.
                        Err(err) => warn!(
                            provider = %name,
                            symbol,
                            error = %err,
                            "failed to cache fetched bars"
                        ),
                    }
                    info!(
                        provider = %name,
                        symbol,
                        rows = bars.len(),
                        start = %start,
                        end = %end,
                        "range fetched"
                    );
                    return Some(bars);
                }
                Err(err) => {
                    warn!(
                        provider = %name,
                        symbol,
                        error = %err,
                        "provider fetch failed, trying next"
                    );
                }
            }
        }

        warn!(symbol, start = %start, end = %end, "all providers failed for range");
        None
    }
}
