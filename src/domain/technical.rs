//! Derived views over historical series: moving-average chart data,
//! volatility profile, monthly returns and sector evolution.

use crate::domain::catalog::Catalog;
use crate::domain::indicator::returns::pct_changes;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::sample_stddev;
use crate::domain::indicator::{IndicatorSeries, LONG_WINDOW, SHORT_WINDOW};
use crate::domain::ohlcv::{guarded_pct, HistoricalBar};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Close, volume and both moving averages for one instrument, aligned by bar.
#[derive(Debug, Clone)]
pub struct TechnicalView {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub volumes: Vec<i64>,
    pub sma_short: IndicatorSeries,
    pub sma_long: IndicatorSeries,
}

pub fn technical_view(symbol: &str, bars: &[HistoricalBar]) -> TechnicalView {
    TechnicalView {
        symbol: symbol.to_string(),
        dates: bars.iter().map(|b| b.date).collect(),
        closes: bars.iter().map(|b| b.close).collect(),
        volumes: bars.iter().map(|b| b.volume).collect(),
        sma_short: calculate_sma(bars, SHORT_WINDOW),
        sma_long: calculate_sma(bars, LONG_WINDOW),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityProfile {
    pub symbol: String,
    pub last_price: f64,
    /// Sample standard deviation of close over the whole series.
    pub volatility: f64,
    /// `volatility / last_price * 100`, zero when the last price is zero.
    pub volatility_pct: f64,
    pub mean_volume: f64,
}

/// Whole-series volatility; `None` with fewer than two bars.
pub fn volatility_profile(symbol: &str, bars: &[HistoricalBar]) -> Option<VolatilityProfile> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volatility = sample_stddev(&closes)?;
    let last_price = *closes.last()?;
    let mean_volume = bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64;

    Some(VolatilityProfile {
        symbol: symbol.to_string(),
        last_price,
        volatility,
        volatility_pct: guarded_pct(volatility, last_price),
        mean_volume,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub return_pct: f64,
}

/// Last close of each calendar month, in date order.
pub fn month_end_closes(bars: &[HistoricalBar]) -> Vec<(i32, u32, f64)> {
    let mut out: Vec<(i32, u32, f64)> = Vec::new();
    for bar in bars {
        let key = (bar.date.year(), bar.date.month());
        match out.last_mut() {
            Some(last) if (last.0, last.1) == key => last.2 = bar.close,
            _ => out.push((key.0, key.1, bar.close)),
        }
    }
    out
}

/// Month-over-month percent change of month-end closes. The first month has
/// no predecessor and is dropped.
pub fn monthly_returns(bars: &[HistoricalBar]) -> Vec<MonthlyReturn> {
    let months = month_end_closes(bars);
    let closes: Vec<f64> = months.iter().map(|m| m.2).collect();
    months
        .iter()
        .zip(pct_changes(&closes))
        .filter_map(|(&(year, month, _), ret)| {
            ret.map(|return_pct| MonthlyReturn {
                year,
                month,
                return_pct,
            })
        })
        .collect()
}

/// Mean monthly return across instruments, keyed by (year, month).
#[derive(Debug, Clone, Default)]
pub struct MonthlyHeatmap {
    pub cells: BTreeMap<(i32, u32), f64>,
}

impl MonthlyHeatmap {
    pub fn build(per_instrument: &[Vec<MonthlyReturn>]) -> Self {
        let mut sums: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
        for series in per_instrument {
            for r in series {
                let entry = sums.entry((r.year, r.month)).or_insert((0.0, 0));
                entry.0 += r.return_pct;
                entry.1 += 1;
            }
        }
        let cells = sums
            .into_iter()
            .map(|(k, (sum, n))| (k, sum / n as f64))
            .collect();
        Self { cells }
    }

    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        self.cells.get(&(year, month)).copied()
    }

    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.cells.keys().map(|(y, _)| *y).collect();
        years.dedup();
        years
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorMonthPoint {
    /// First day of the month.
    pub month: NaiveDate,
    pub sector: String,
    pub mean_close: f64,
}

/// Mean close across all bars of each sector's instruments, per month.
/// Ordered by month, then catalog sector order. Histories for symbols not in
/// the catalog are ignored.
pub fn sector_evolution(
    catalog: &Catalog,
    histories: &HashMap<String, Vec<HistoricalBar>>,
) -> Vec<SectorMonthPoint> {
    let sector_rank: HashMap<&str, usize> = catalog
        .sectors()
        .into_iter()
        .enumerate()
        .map(|(i, s)| (s, i))
        .collect();

    let mut sums: BTreeMap<(NaiveDate, usize), (f64, usize)> = BTreeMap::new();
    for (symbol, bars) in histories {
        let Some(instrument) = catalog.get(symbol) else {
            continue;
        };
        let rank = sector_rank[instrument.sector.as_str()];
        for bar in bars {
            let Some(month) = NaiveDate::from_ymd_opt(bar.date.year(), bar.date.month(), 1) else {
                continue;
            };
            let entry = sums.entry((month, rank)).or_insert((0.0, 0));
            entry.0 += bar.close;
            entry.1 += 1;
        }
    }

    let sectors = catalog.sectors();
    sums.into_iter()
        .map(|((month, rank), (sum, n))| SectorMonthPoint {
            month,
            sector: sectors[rank].to_string(),
            mean_close: sum / n as f64,
        })
        .collect()
}
