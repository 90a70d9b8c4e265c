//! Market-data layer: bar cache, gap resolution, and provider fetch.
//!
//! Control flow for a data request: read the cache, resolve missing date
//! ranges against the trading calendar, fetch only the gaps through the
//! provider registry, write the fetched bars back, return the merged
//! series.

pub mod cache;
pub mod calendar;
pub mod gaps;
pub mod provider;
pub mod service;

pub use cache::{BarCache, CacheError, CacheSummaryEntry};
pub use calendar::{CalendarError, Market, TradingCalendar, WeekdayCalendar};
pub use gaps::{DEFAULT_GAP_TOLERANCE_DAYS, GapResolver};
pub use provider::{MarketDataProvider, ProviderError, ProviderRegistry};
pub use service::{DataServiceError, MarketDataService};
