//! Persistent bar cache backed by embedded SQLite.
//!
//! Single canonical schema: every row carries the `data_source`
//! discriminator, and uniqueness over
//! (symbol, data_type, data_source, trade_date) is enforced by the storage
//! layer, not application logic. Writes are upserts; a second write for the
//! same key replaces the price/volume fields silently.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Bar, DataType};

/// Errors from bar-cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Underlying database error.
    #[error("cache database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Per-series cache coverage, one entry per (symbol, type, source) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSummaryEntry {
    /// Instrument symbol.
    pub symbol: String,
    /// Instrument kind.
    pub data_type: DataType,
    /// Originating source.
    pub source: String,
    /// Number of cached rows.
    pub rows: u64,
    /// Earliest cached trade date.
    pub first_date: NaiveDate,
    /// Latest cached trade date.
    pub last_date: NaiveDate,
}

/// Raw row as stored, before decimal/tag conversion.
struct StoredRow {
    symbol: String,
    data_type: String,
    source: String,
    trade_date: NaiveDate,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: i64,
    turnover: String,
}

const SELECT_COLUMNS: &str = "symbol, data_type, data_source, trade_date, \
     open_price, high_price, low_price, close_price, volume, turnover";

/// Persistent store for daily bars, keyed by
/// (symbol, data type, source, trade date).
pub struct BarCache {
    conn: Connection,
}

impl BarCache {
    /// Open (or create) a cache database at `path`.
    pub fn open(path: &str) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.init_schema()?;
        debug!(path, "bar cache opened");
        Ok(cache)
    }

    /// Open a throwaway in-memory cache. Used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<(), CacheError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS market_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                data_type TEXT NOT NULL,
                data_source TEXT NOT NULL,
                trade_date TEXT NOT NULL,
                open_price TEXT NOT NULL,
                high_price TEXT NOT NULL,
                low_price TEXT NOT NULL,
                close_price TEXT NOT NULL,
                volume INTEGER NOT NULL DEFAULT 0,
                turnover TEXT NOT NULL DEFAULT '0',
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(symbol, data_type, data_source, trade_date)
            );
            CREATE INDEX IF NOT EXISTS idx_symbol_type_source_date
                ON market_data(symbol, data_type, data_source, trade_date);",
        )?;
        Ok(())
    }

    /// Read all cached bars for `symbol` in `[start, end]`, ascending by
    /// date. When multiple sources cover the same date, all rows are
    /// returned; precedence is the consumer's decision.
    pub fn read_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, CacheError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM market_data
             WHERE symbol = ?1 AND trade_date >= ?2 AND trade_date <= ?3
             ORDER BY trade_date, data_source"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![symbol, start, end], Self::map_stored_row)?;
        Self::collect_bars(rows)
    }

    /// Read cached bars for `symbol` in `[start, end]` from a single
    /// source only.
    pub fn read_range_for_source(
        &self,
        symbol: &str,
        source: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, CacheError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM market_data
             WHERE symbol = ?1 AND data_source = ?2
               AND trade_date >= ?3 AND trade_date <= ?4
             ORDER BY trade_date"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![symbol, source, start, end], Self::map_stored_row)?;
        Self::collect_bars(rows)
    }

    /// Upsert a batch of bars for `symbol` under the given type and source
    /// tags. Rows failing OHLC validation or the individual insert are
    /// logged and skipped; the rest of the batch still lands. Returns the
    /// number of rows written.
    pub fn write_bars(
        &self,
        symbol: &str,
        bars: &[Bar],
        data_type: DataType,
        source: &str,
    ) -> Result<usize, CacheError> {
        if bars.is_empty() {
            return Ok(0);
        }

        let mut stmt = self.conn.prepare(
            "INSERT OR REPLACE INTO market_data
             (symbol, data_type, data_source, trade_date,
              open_price, high_price, low_price, close_price, volume, turnover)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;

        let mut written = 0usize;
        for bar in bars {
            if let Err(issue) = bar.validate() {
                warn!(
                    symbol,
                    date = %bar.trade_date,
                    %issue,
                    "skipping malformed bar"
                );
                continue;
            }

            let result = stmt.execute(params![
                symbol,
                data_type.as_str(),
                source,
                bar.trade_date,
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume,
                bar.turnover.to_string(),
            ]);

            match result {
                Ok(_) => written += 1,
                Err(err) => {
                    // A single bad row must not abort the batch.
                    warn!(
                        symbol,
                        date = %bar.trade_date,
                        error = %err,
                        "failed to upsert bar, skipping"
                    );
                }
            }
        }

        debug!(symbol, source, written, total = bars.len(), "bars cached");
        Ok(written)
    }

    /// Delete cached rows. Scope narrows with the given filters; calling
    /// with neither clears the whole cache (confirmation is the caller's
    /// responsibility). Returns the number of rows deleted.
    pub fn clear(
        &self,
        symbol: Option<&str>,
        source: Option<&str>,
    ) -> Result<usize, CacheError> {
        let deleted = match (symbol, source) {
            (Some(sym), Some(src)) => self.conn.execute(
                "DELETE FROM market_data WHERE symbol = ?1 AND data_source = ?2",
                params![sym, src],
            )?,
            (Some(sym), None) => self
                .conn
                .execute("DELETE FROM market_data WHERE symbol = ?1", params![sym])?,
            (None, Some(src)) => self.conn.execute(
                "DELETE FROM market_data WHERE data_source = ?1",
                params![src],
            )?,
            (None, None) => self.conn.execute("DELETE FROM market_data", [])?,
        };
        debug!(?symbol, ?source, deleted, "cache rows cleared");
        Ok(deleted)
    }

    /// Coverage summary: row count and date span per
    /// (symbol, data type, source) key.
    pub fn summary(&self) -> Result<Vec<CacheSummaryEntry>, CacheError> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol, data_type, data_source, COUNT(*),
                    MIN(trade_date), MAX(trade_date)
             FROM market_data
             GROUP BY symbol, data_type, data_source
             ORDER BY symbol, data_type, data_source",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, NaiveDate>(4)?,
                row.get::<_, NaiveDate>(5)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (symbol, type_tag, source, count, first_date, last_date) = row?;
            let Some(data_type) = DataType::from_tag(&type_tag) else {
                warn!(
                    symbol = %symbol,
                    type_tag = %type_tag,
                    "unknown data_type tag in cache, skipping"
                );
                continue;
            };
            entries.push(CacheSummaryEntry {
                symbol,
                data_type,
                source,
                rows: count,
                first_date,
                last_date,
            });
        }
        Ok(entries)
    }

    fn map_stored_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            symbol: row.get(0)?,
            data_type: row.get(1)?,
            source: row.get(2)?,
            trade_date: row.get(3)?,
            open: row.get(4)?,
            high: row.get(5)?,
            low: row.get(6)?,
            close: row.get(7)?,
            volume: row.get(8)?,
            turnover: row.get(9)?,
        })
    }

    /// Convert stored rows to bars, dropping rows whose decimal fields no
    /// longer parse. Corrupt rows are a data-integrity warning, not a
    /// failure of the whole read.
    fn collect_bars<I>(rows: I) -> Result<Vec<Bar>, CacheError>
    where
        I: Iterator<Item = rusqlite::Result<StoredRow>>,
    {
        let mut bars = Vec::new();
        for row in rows {
            let stored = row?;
            match Self::bar_from_stored(&stored) {
                Some(bar) => bars.push(bar),
                None => warn!(
                    symbol = %stored.symbol,
                    date = %stored.trade_date,
                    data_type = %stored.data_type,
                    "corrupt cache row, skipping"
                ),
            }
        }
        Ok(bars)
    }

    fn bar_from_stored(stored: &StoredRow) -> Option<Bar> {
        Some(Bar {
            symbol: stored.symbol.clone(),
            trade_date: stored.trade_date,
            open: Decimal::from_str(&stored.open).ok()?,
            high: Decimal::from_str(&stored.high).ok()?,
            low: Decimal::from_str(&stored.low).ok()?,
            close: Decimal::from_str(&stored.close).ok()?,
            volume: stored.volume,
            turnover: Decimal::from_str(&stored.turnover).ok()?,
            source: stored.source.clone(),
        })
    }
}
