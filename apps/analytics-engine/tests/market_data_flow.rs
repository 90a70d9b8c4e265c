//! End-to-end market-data flow: cold fetch, persistence across reopen,
//! priority fallback, and explicit cache clearing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use analytics_engine::marketdata::calendar::weekdays_in_range;
use analytics_engine::{
    Bar, BarCache, DataServiceConfig, DataType, GapResolver, MarketDataProvider,
    MarketDataService, ProviderError, ProviderRegistry, WeekdayCalendar,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Provider serving synthetic bars for every weekday in range.
struct SyntheticProvider {
    name: String,
    base_price: Decimal,
    calls: AtomicUsize,
}

impl SyntheticProvider {
    fn new(name: &str, base_price: Decimal) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            base_price,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_symbol(&self, symbol: &str) -> bool {
        symbol.ends_with(".SH")
    }

    fn data_type(&self, _symbol: &str) -> DataType {
        DataType::Index
    }

    fn historical_data(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(weekdays_in_range(start, end)
            .into_iter()
            .map(|day| Bar {
                symbol: symbol.to_string(),
                trade_date: day,
                open: self.base_price,
                high: self.base_price + dec!(1),
                low: self.base_price - dec!(1),
                close: self.base_price,
                volume: 10_000,
                turnover: self.base_price * dec!(10_000),
                source: self.name.clone(),
            })
            .collect())
    }
}

/// Provider that fails every call.
struct OutageProvider;

impl MarketDataProvider for OutageProvider {
    fn name(&self) -> &str {
        "OUTAGE"
    }

    fn supports_symbol(&self, _symbol: &str) -> bool {
        true
    }

    fn historical_data(
        &self,
        _symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Bar>, ProviderError> {
        Err(ProviderError::Connection {
            message: "connection reset".to_string(),
        })
    }
}

fn service_at(path: &str, registry: ProviderRegistry) -> Result<MarketDataService> {
    Ok(MarketDataService::new(
        BarCache::open(path)?,
        registry,
        GapResolver::new(Arc::new(WeekdayCalendar)),
    ))
}

#[test]
fn cold_fetch_persists_across_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("bars.db");
    let db_path = db_path.to_str().unwrap();

    let provider = SyntheticProvider::new("TUSHARE", dec!(3500));

    // First process: cold cache, one provider call.
    {
        let mut registry = ProviderRegistry::new();
        registry.register(1, provider.clone());
        let service = service_at(db_path, registry)?;

        let bars = service.get_daily_bars("000300.SH", date(2024, 1, 1), date(2024, 1, 12))?;
        assert_eq!(bars.len(), 10);
        assert_eq!(provider.calls(), 1);
    }

    // Second process over the same file: full cache hit, provider untouched.
    {
        let mut registry = ProviderRegistry::new();
        registry.register(1, provider.clone());
        let service = service_at(db_path, registry)?;

        let bars = service.get_daily_bars("000300.SH", date(2024, 1, 1), date(2024, 1, 12))?;
        assert_eq!(bars.len(), 10);
        assert_eq!(provider.calls(), 1);
        assert!(bars.iter().all(|b| b.source == "TUSHARE"));

        let summary = service.cache().summary()?;
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].rows, 10);
        assert_eq!(summary[0].source, "TUSHARE");
    }

    Ok(())
}

#[test]
fn outage_on_primary_falls_back_and_tags_backup_source() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("bars.db");
    let backup = SyntheticProvider::new("FUTU", dec!(3498));

    let mut registry = ProviderRegistry::new();
    registry.register(1, Arc::new(OutageProvider));
    registry.register(2, backup.clone());
    let service = service_at(db_path.to_str().unwrap(), registry)?;

    let bars = service.get_daily_bars("000300.SH", date(2024, 2, 5), date(2024, 2, 9))?;
    assert_eq!(bars.len(), 5);
    assert_eq!(backup.calls(), 1);
    assert!(bars.iter().all(|b| b.source == "FUTU"));

    // Cached rows carry the backup provider's tag.
    let cached = service
        .cache()
        .read_range_for_source("000300.SH", "FUTU", date(2024, 2, 5), date(2024, 2, 9))?;
    assert_eq!(cached.len(), 5);

    Ok(())
}

#[test]
fn total_outage_returns_cached_partial_series() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("bars.db");

    let mut registry = ProviderRegistry::new();
    registry.register(1, Arc::new(OutageProvider));
    let service = service_at(db_path.to_str().unwrap(), registry)?;

    // Seed three cached days in the middle of the requested range.
    let seed: Vec<Bar> = weekdays_in_range(date(2024, 3, 5), date(2024, 3, 7))
        .into_iter()
        .map(|day| Bar {
            symbol: "000300.SH".to_string(),
            trade_date: day,
            open: dec!(3500),
            high: dec!(3510),
            low: dec!(3490),
            close: dec!(3505),
            volume: 1,
            turnover: dec!(3505),
            source: "TUSHARE".to_string(),
        })
        .collect();
    service
        .cache()
        .write_bars("000300.SH", &seed, DataType::Index, "TUSHARE")?;

    let bars = service.get_daily_bars("000300.SH", date(2024, 3, 1), date(2024, 3, 15))?;
    assert_eq!(bars.len(), 3);

    Ok(())
}

#[test]
fn config_drives_cache_path_tolerance_and_priorities() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("bars.db");

    let config: DataServiceConfig = serde_json::from_str(&format!(
        r#"{{
            "db_path": "{}",
            "gap_tolerance_days": 7,
            "providers": [
                {{"name": "FUTU", "priority": 2}},
                {{"name": "TUSHARE", "priority": 1}},
                {{"name": "LEGACY", "priority": 3, "enabled": false}}
            ]
        }}"#,
        db_path.to_str().unwrap()
    ))?;

    let tushare = SyntheticProvider::new("TUSHARE", dec!(3500));
    let futu = SyntheticProvider::new("FUTU", dec!(3498));
    let adapters: Vec<Arc<dyn MarketDataProvider>> = vec![tushare.clone(), futu.clone()];

    // Registration order comes from the config's priority table; disabled
    // entries never make it into the registry.
    let mut registry = ProviderRegistry::new();
    for settings in config.providers.iter().filter(|p| p.enabled) {
        if let Some(adapter) = adapters.iter().find(|a| a.name() == settings.name) {
            registry.register(settings.priority, adapter.clone());
        }
    }
    let service = MarketDataService::new(
        BarCache::open(&config.db_path)?,
        registry,
        GapResolver::with_tolerance(Arc::new(WeekdayCalendar), config.gap_tolerance_days),
    );

    let bars = service.get_daily_bars("000300.SH", date(2024, 1, 1), date(2024, 1, 5))?;
    assert_eq!(bars.len(), 5);
    // TUSHARE has the lower priority number, so it wins.
    assert_eq!(tushare.calls(), 1);
    assert_eq!(futu.calls(), 0);
    assert!(bars.iter().all(|b| b.source == "TUSHARE"));

    Ok(())
}

#[test]
fn clear_then_refetch_goes_remote_again() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("bars.db");
    let provider = SyntheticProvider::new("TUSHARE", dec!(3500));

    let mut registry = ProviderRegistry::new();
    registry.register(1, provider.clone());
    let service = service_at(db_path.to_str().unwrap(), registry)?;

    service.get_daily_bars("000300.SH", date(2024, 1, 1), date(2024, 1, 5))?;
    assert_eq!(provider.calls(), 1);

    let deleted = service.cache().clear(Some("000300.SH"), None)?;
    assert_eq!(deleted, 5);

    service.get_daily_bars("000300.SH", date(2024, 1, 1), date(2024, 1, 5))?;
    assert_eq!(provider.calls(), 2);

    Ok(())
}
