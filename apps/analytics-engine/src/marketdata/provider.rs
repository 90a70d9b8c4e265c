//! Data-provider abstraction and priority-ordered registry.
//!
//! Concrete vendor adapters (exchange APIs, vendor SDKs) live outside this
//! crate; the core depends only on [`MarketDataProvider`]. Providers are
//! synchronous: every call runs to completion before returning.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::models::{Bar, DataType};

/// Error from a data-provider adapter.
///
/// All variants are recoverable from the fetch loop's perspective: a
/// failing provider is logged and the next one in priority order is tried.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Connection to the vendor failed.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error details.
        message: String,
    },

    /// The provider does not carry data for the symbol.
    #[error("symbol not found: {symbol}")]
    SymbolNotFound {
        /// The unknown symbol.
        symbol: String,
    },

    /// Data temporarily unavailable for the requested range.
    #[error("data unavailable: {message}")]
    DataUnavailable {
        /// Error details.
        message: String,
    },

    /// The vendor throttled the request.
    #[error("rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Any other vendor API error.
    #[error("provider API error: {message}")]
    Api {
        /// Error details.
        message: String,
    },
}

/// A remote source of historical daily bars.
pub trait MarketDataProvider: Send + Sync {
    /// Stable provider name, used as the cache source tag.
    fn name(&self) -> &str;

    /// Whether this provider carries the symbol at all. Unsupported
    /// symbols are skipped by the fetch loop without counting as failures.
    fn supports_symbol(&self, symbol: &str) -> bool;

    /// Instrument kind for a symbol, used as the cache data-type tag.
    /// Defaults to stock when the provider has no richer metadata.
    fn data_type(&self, _symbol: &str) -> DataType {
        DataType::Stock
    }

    /// Daily bars for `[start, end]` (inclusive). An empty result is valid
    /// and means the provider has nothing for the range.
    fn historical_data(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ProviderError>;
}

/// A provider with its configured priority. Lower numbers are tried first.
struct RegisteredProvider {
    priority: u32,
    provider: Arc<dyn MarketDataProvider>,
}

/// Priority-ordered collection of data providers.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider with the given priority. Ties keep
    /// registration order.
    pub fn register(&mut self, priority: u32, provider: Arc<dyn MarketDataProvider>) {
        debug!(provider = provider.name(), priority, "provider registered");
        self.providers.push(RegisteredProvider { priority, provider });
        self.providers.sort_by_key(|p| p.priority);
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// All providers in ascending priority order.
    #[must_use]
    pub fn by_priority(&self) -> Vec<Arc<dyn MarketDataProvider>> {
        self.providers.iter().map(|p| p.provider.clone()).collect()
    }

    /// Providers supporting `symbol`, in ascending priority order.
    #[must_use]
    pub fn providers_for_symbol(&self, symbol: &str) -> Vec<Arc<dyn MarketDataProvider>> {
        self.providers
            .iter()
            .filter(|p| p.provider.supports_symbol(symbol))
            .map(|p| p.provider.clone())
            .collect()
    }

    /// The highest-priority provider, if any.
    #[must_use]
    pub fn primary(&self) -> Option<Arc<dyn MarketDataProvider>> {
        self.providers.first().map(|p| p.provider.clone())
    }
}
