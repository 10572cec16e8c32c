//! Synthetic random-walk market data.
//!
//! Every symbol gets a deterministic three-year business-day walk derived from
//! the adapter seed and the symbol, so the same configuration always produces
//! the same history. [`SyntheticAdapter::advance`] moves to the next refresh
//! generation, which re-draws only the latest session.

use crate::domain::catalog::Catalog;
use crate::domain::error::DashboardError;
use crate::domain::market_data::{Fundamentals, Lookback, MarketData};
use crate::domain::ohlcv::HistoricalBar;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

const HISTORY_DAYS: usize = 756;
/// Market cap per index weight point.
const CAP_PER_WEIGHT: f64 = 3.0e10;

pub struct SyntheticAdapter {
    seed: u64,
    end_date: NaiveDate,
    daily_volatility: f64,
    weights: HashMap<String, f64>,
    base_prices: HashMap<String, f64>,
    outages: HashSet<String>,
    generation: AtomicU64,
}

/// FNV-1a, stable across builds and platforms.
fn symbol_hash(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |h, b| {
        (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

fn business_days_ending(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut d = end;
    while days.len() < count {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(d);
        }
        match d.pred_opt() {
            Some(prev) => d = prev,
            None => break,
        }
    }
    days.reverse();
    days
}

impl SyntheticAdapter {
    pub fn new(seed: u64, end_date: NaiveDate, daily_volatility: f64) -> Self {
        Self {
            seed,
            end_date,
            daily_volatility,
            weights: HashMap::new(),
            base_prices: HashMap::new(),
            outages: HashSet::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Uses catalog weights to synthesize market caps.
    pub fn with_catalog(mut self, catalog: &Catalog) -> Self {
        self.weights = catalog
            .instruments()
            .iter()
            .map(|i| (i.symbol.clone(), i.weight))
            .collect();
        self
    }

    pub fn with_base_price(mut self, symbol: &str, price: f64) -> Self {
        self.base_prices.insert(symbol.to_string(), price);
        self
    }

    /// Makes `symbol` return no data, as a delisted or unreachable ticker would.
    pub fn with_outage(mut self, symbol: &str) -> Self {
        self.outages.insert(symbol.to_string());
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Starts a new refresh generation.
    pub fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn base_price(&self, symbol: &str) -> f64 {
        self.base_prices
            .get(symbol)
            .copied()
            .unwrap_or_else(|| 20.0 + (symbol_hash(symbol) % 480) as f64)
    }

    fn shock(&self, rng: &mut StdRng) -> f64 {
        // uniform on [-a, a] has standard deviation a / sqrt(3)
        let a = self.daily_volatility * 3.0f64.sqrt();
        rng.gen_range(-a..=a)
    }

    fn bar(&self, rng: &mut StdRng, symbol: &str, date: NaiveDate, prev_close: f64) -> HistoricalBar {
        let open = prev_close * (1.0 + self.shock(rng) * 0.25);
        let close = open * (1.0 + self.shock(rng));
        let wick = self.daily_volatility * 0.5;
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..=wick));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..=wick));
        let volume = (1_000_000.0 * rng.gen_range(0.5f64..1.5)).round() as i64;
        HistoricalBar {
            symbol: symbol.to_string(),
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn history(&self, symbol: &str) -> Vec<HistoricalBar> {
        let key = symbol_hash(symbol);
        let mut rng = StdRng::seed_from_u64(self.seed ^ key);
        let days = business_days_ending(self.end_date, HISTORY_DAYS);

        let mut bars = Vec::with_capacity(days.len());
        let mut prev_close = self.base_price(symbol);
        let (settled, last) = days.split_at(days.len().saturating_sub(1));
        for &date in settled {
            let bar = self.bar(&mut rng, symbol, date, prev_close);
            prev_close = bar.close;
            bars.push(bar);
        }

        let generation = self.generation();
        let mut live = StdRng::seed_from_u64(self.seed ^ key ^ generation.rotate_left(32));
        for &date in last {
            bars.push(self.bar(&mut live, symbol, date, prev_close));
        }
        bars
    }

    fn fundamentals(&self, symbol: &str) -> Option<Fundamentals> {
        let weight = self.weights.get(symbol)?;
        Some(Fundamentals {
            market_cap: Some(weight * CAP_PER_WEIGHT),
            dividend_yield: Some(1.0 + (symbol_hash(symbol) % 400) as f64 / 100.0),
        })
    }
}

impl MarketDataPort for SyntheticAdapter {
    fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<MarketData, DashboardError> {
        if self.outages.contains(symbol) {
            return Ok(MarketData::empty());
        }

        let mut bars = self.history(symbol);
        if lookback == Lookback::OneDay {
            let last = bars.pop();
            bars = last.into_iter().collect();
        } else {
            let start = lookback.start_from(self.end_date);
            bars.retain(|b| b.date >= start);
        }

        Ok(MarketData {
            bars,
            fundamentals: self.fundamentals(symbol),
        })
    }

    fn begin_cycle(&self) {
        self.advance();
    }
}
