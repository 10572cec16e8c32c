#![allow(dead_code)]

use cac40dash::domain::catalog::{Catalog, Instrument};
use cac40dash::domain::error::DashboardError;
use cac40dash::domain::market_data::{Fundamentals, Lookback, MarketData};
pub use cac40dash::domain::ohlcv::HistoricalBar;
use cac40dash::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory provider. Lookbacks other than one day return the whole series.
pub struct MockProvider {
    pub data: HashMap<String, Vec<HistoricalBar>>,
    pub fundamentals: HashMap<String, Fundamentals>,
    pub errors: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            fundamentals: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<HistoricalBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    /// A single session with the given open and close.
    pub fn with_session(self, symbol: &str, open: f64, close: f64) -> Self {
        let bar = HistoricalBar {
            symbol: symbol.to_string(),
            date: date(2024, 6, 3),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1_000,
        };
        self.with_bars(symbol, vec![bar])
    }

    pub fn with_fundamentals(mut self, symbol: &str, market_cap: f64, dividend_yield: f64) -> Self {
        self.fundamentals.insert(
            symbol.to_string(),
            Fundamentals {
                market_cap: Some(market_cap),
                dividend_yield: Some(dividend_yield),
            },
        );
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataPort for MockProvider {
    fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<MarketData, DashboardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(DashboardError::ProviderUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let mut bars = self.data.get(symbol).cloned().unwrap_or_default();
        if lookback == Lookback::OneDay && bars.len() > 1 {
            bars.drain(..bars.len() - 1);
        }
        Ok(MarketData {
            bars,
            fundamentals: self.fundamentals.get(symbol).copied(),
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: &str, close: f64) -> HistoricalBar {
    HistoricalBar {
        symbol: symbol.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Consecutive calendar days starting at `start_date`, closes from `closes`.
pub fn bars_from_closes(symbol: &str, start_date: &str, closes: &[f64]) -> Vec<HistoricalBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| HistoricalBar {
            symbol: symbol.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000 + i as i64,
        })
        .collect()
}

pub fn instrument(symbol: &str, sector: &str, weight: f64) -> Instrument {
    Instrument {
        symbol: symbol.to_string(),
        name: format!("{symbol} SA"),
        sector: sector.to_string(),
        sub_sector: String::new(),
        country: "France".to_string(),
        color: "#000000".to_string(),
        weight,
        description: String::new(),
    }
}

/// Three instruments: A and B in Luxe, C in Finance.
pub fn small_catalog() -> Catalog {
    Catalog::new(vec![
        instrument("A", "Luxe", 5.0),
        instrument("B", "Luxe", 3.0),
        instrument("C", "Finance", 2.0),
    ])
    .unwrap()
}
