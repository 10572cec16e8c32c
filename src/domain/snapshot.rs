//! Snapshot aggregation: one row per instrument for the latest session.
//!
//! Aggregation is fail-soft. An instrument whose provider call errors or
//! returns no bars is left out of the table and recorded in
//! [`SnapshotTable::skipped`]; the remaining instruments are still reported.

use crate::domain::catalog::{Catalog, Instrument};
use crate::domain::market_data::{Lookback, MarketData};
use crate::domain::ohlcv::guarded_pct;
use crate::ports::market_data_port::MarketDataPort;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    /// Exactly zero change. With continuous prices this is rare; it is kept
    /// as a literal comparison rather than a tolerance band.
    Flat,
}

impl Trend {
    pub fn of(change_pct: f64) -> Self {
        if change_pct > 0.0 {
            Trend::Up
        } else if change_pct < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: i64,
    pub change: f64,
    pub change_pct: f64,
    pub market_cap: f64,
    pub dividend_yield: f64,
    pub weight: f64,
    /// Whole-series volatility in percent of price, when it has been computed.
    pub volatility_pct: Option<f64>,
}

impl Snapshot {
    pub fn trend(&self) -> Trend {
        Trend::of(self.change_pct)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    ProviderError(String),
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotTable {
    pub rows: Vec<Snapshot>,
    pub skipped: Vec<SkippedSymbol>,
}

impl SnapshotTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&Snapshot> {
        self.rows.iter().find(|s| s.symbol == symbol)
    }
}

/// Builds a snapshot from the last bar of `data`, or `None` when it is empty.
pub fn build_snapshot(instrument: &Instrument, data: &MarketData) -> Option<Snapshot> {
    let latest = data.latest()?;
    let change = latest.close - latest.open;
    let fundamentals = data.fundamentals.unwrap_or_default();

    Some(Snapshot {
        symbol: instrument.symbol.clone(),
        name: instrument.name.clone(),
        sector: instrument.sector.clone(),
        price: latest.close,
        open: latest.open,
        high: latest.high,
        low: latest.low,
        volume: latest.volume,
        change,
        change_pct: guarded_pct(change, latest.open),
        market_cap: fundamentals.market_cap.unwrap_or(0.0),
        dividend_yield: fundamentals.dividend_yield.unwrap_or(0.0),
        weight: instrument.weight,
        volatility_pct: None,
    })
}

/// Assembles a table from per-instrument outcomes, in catalog order.
///
/// `outcomes` pairs each symbol with either its provider data or the reason it
/// is missing. Symbols not in the catalog are ignored.
pub fn assemble(
    catalog: &Catalog,
    outcomes: Vec<(String, Result<MarketData, SkipReason>)>,
) -> SnapshotTable {
    let mut table = SnapshotTable::default();
    let mut by_symbol: std::collections::HashMap<String, Result<MarketData, SkipReason>> =
        outcomes.into_iter().collect();

    for instrument in catalog.instruments() {
        let outcome = by_symbol
            .remove(&instrument.symbol)
            .unwrap_or(Err(SkipReason::NoData));

        let reason = match outcome {
            Ok(data) => match build_snapshot(instrument, &data) {
                Some(snapshot) => {
                    debug!("{}: {:.2} ({:+.2}%)", snapshot.symbol, snapshot.price, snapshot.change_pct);
                    table.rows.push(snapshot);
                    continue;
                }
                None => SkipReason::NoData,
            },
            Err(reason) => reason,
        };

        match &reason {
            SkipReason::NoData => warn!("skipping {} (no data)", instrument.symbol),
            SkipReason::ProviderError(e) => warn!("skipping {} ({})", instrument.symbol, e),
            SkipReason::Timeout => warn!("skipping {} (provider timed out)", instrument.symbol),
        }
        table.skipped.push(SkippedSymbol {
            symbol: instrument.symbol.clone(),
            reason,
        });
    }

    table
}

/// Fetches the latest session for every catalog instrument, one at a time.
pub fn aggregate_snapshots(catalog: &Catalog, provider: &dyn MarketDataPort) -> SnapshotTable {
    let outcomes = catalog
        .symbols()
        .map(|symbol| {
            let outcome = provider
                .fetch(symbol, Lookback::OneDay)
                .map_err(|e| SkipReason::ProviderError(e.to_string()));
            (symbol.to_string(), outcome)
        })
        .collect();
    assemble(catalog, outcomes)
}
