//! CSV directory market data adapter.
//!
//! Layout: `<SYMBOL>.csv` with `date,open,high,low,close,volume` rows, plus an
//! optional `fundamentals.csv` with `symbol,market_cap,dividend_yield` where
//! the yield is a fraction (0.025 for 2.5%). Lookback windows are measured
//! back from the latest bar in each file, so a stale export still yields a
//! full window.

use crate::domain::error::DashboardError;
use crate::domain::market_data::{Fundamentals, Lookback, MarketData};
use crate::domain::ohlcv::{normalize_bars, HistoricalBar};
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct FundamentalsRecord {
    symbol: String,
    market_cap: Option<f64>,
    dividend_yield: Option<f64>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn unavailable(symbol: &str, reason: String) -> DashboardError {
        DashboardError::ProviderUnavailable {
            symbol: symbol.to_string(),
            reason,
        }
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<HistoricalBar>, DashboardError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            Self::unavailable(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.deserialize::<BarRecord>() {
            let record = result
                .map_err(|e| Self::unavailable(symbol, format!("CSV parse error: {}", e)))?;
            let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d").map_err(|e| {
                Self::unavailable(symbol, format!("invalid date '{}': {}", record.date, e))
            })?;

            bars.push(HistoricalBar {
                symbol: symbol.to_string(),
                date,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume.round() as i64,
            });
        }

        normalize_bars(&mut bars);
        Ok(bars)
    }

    /// Fundamentals keyed by symbol; an absent file means none are known.
    pub fn read_fundamentals(&self) -> Result<HashMap<String, Fundamentals>, DashboardError> {
        let path = self.base_path.join(FUNDAMENTALS_FILE);
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| {
            Self::unavailable("*", format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut out = HashMap::new();
        for result in rdr.deserialize::<FundamentalsRecord>() {
            let record =
                result.map_err(|e| Self::unavailable("*", format!("CSV parse error: {}", e)))?;
            out.insert(
                record.symbol.trim().to_string(),
                Fundamentals {
                    market_cap: record.market_cap,
                    dividend_yield: record.dividend_yield.map(|y| y * 100.0),
                },
            );
        }
        Ok(out)
    }

    /// Symbols with a bar file in the directory.
    pub fn list_symbols(&self) -> Result<Vec<String>, DashboardError> {
        let entries = fs::read_dir(&self.base_path).map_err(DashboardError::Io)?;

        let mut symbols = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(symbol) = name.strip_suffix(".csv") {
                if name != FUNDAMENTALS_FILE {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<MarketData, DashboardError> {
        let mut bars = self.read_bars(symbol)?;

        if let Some(last) = bars.last().map(|b| b.date) {
            if lookback == Lookback::OneDay {
                bars.drain(..bars.len() - 1);
            } else {
                let start = lookback.start_from(last);
                bars.retain(|b| b.date >= start);
            }
        }
        debug!("{}: {} bars for {}", symbol, bars.len(), lookback);

        let fundamentals = self.read_fundamentals()?.remove(symbol);
        Ok(MarketData { bars, fundamentals })
    }
}
