//! Market-wide key metrics and index quotes.

use crate::domain::market_data::Lookback;
use crate::domain::ohlcv::guarded_pct;
use crate::domain::snapshot::{Snapshot, Trend};
use crate::ports::market_data_port::MarketDataPort;
use log::debug;

/// Components scaled to an index level when the index quote is unavailable.
pub const INDEX_COMPONENTS: f64 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyMetrics {
    /// Mean percent change across the table; zero when empty.
    pub mean_change_pct: f64,
    pub advancers: usize,
    pub decliners: usize,
    pub unchanged: usize,
    pub total_volume: i64,
    pub total_market_cap: f64,
}

impl KeyMetrics {
    pub fn compute(rows: &[Snapshot]) -> Self {
        let mut advancers = 0;
        let mut decliners = 0;
        let mut unchanged = 0;
        for s in rows {
            match s.trend() {
                Trend::Up => advancers += 1,
                Trend::Down => decliners += 1,
                Trend::Flat => unchanged += 1,
            }
        }

        let mean_change_pct = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|s| s.change_pct).sum::<f64>() / rows.len() as f64
        };

        Self {
            mean_change_pct,
            advancers,
            decliners,
            unchanged,
            total_volume: rows.iter().map(|s| s.volume).sum(),
            total_market_cap: rows.iter().map(|s| s.market_cap).sum(),
        }
    }

    /// Advancers minus everything that did not advance.
    pub fn breadth(&self) -> i64 {
        self.advancers as i64 - (self.decliners + self.unchanged) as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuote {
    pub name: String,
    pub symbol: String,
    pub value: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexLevel {
    Quoted(f64),
    /// Mean component price scaled by [`INDEX_COMPONENTS`].
    Estimated(f64),
}

impl IndexLevel {
    pub fn value(&self) -> f64 {
        match self {
            IndexLevel::Quoted(v) | IndexLevel::Estimated(v) => *v,
        }
    }
}

/// Latest session for an index symbol, or `None` when unavailable.
pub fn index_quote(provider: &dyn MarketDataPort, name: &str, symbol: &str) -> Option<IndexQuote> {
    let data = match provider.fetch(symbol, Lookback::OneDay) {
        Ok(data) => data,
        Err(e) => {
            debug!("index {} unavailable: {}", symbol, e);
            return None;
        }
    };
    let latest = data.latest()?;
    Some(IndexQuote {
        name: name.to_string(),
        symbol: symbol.to_string(),
        value: latest.close,
        change_pct: guarded_pct(latest.close - latest.open, latest.open),
    })
}

/// Quoted index level, falling back to an estimate from the components.
pub fn index_level(
    provider: &dyn MarketDataPort,
    index_symbol: &str,
    rows: &[Snapshot],
) -> Option<IndexLevel> {
    if let Some(quote) = index_quote(provider, index_symbol, index_symbol) {
        return Some(IndexLevel::Quoted(quote.value));
    }
    if rows.is_empty() {
        return None;
    }
    let mean_price = rows.iter().map(|s| s.price).sum::<f64>() / rows.len() as f64;
    Some(IndexLevel::Estimated(mean_price * INDEX_COMPONENTS))
}

/// Quotes for `(name, symbol)` pairs, omitting the unavailable ones.
pub fn world_indices(provider: &dyn MarketDataPort, indices: &[(String, String)]) -> Vec<IndexQuote> {
    indices
        .iter()
        .filter_map(|(name, symbol)| index_quote(provider, name, symbol))
        .collect()
}
