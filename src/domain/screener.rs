//! Query and screener filters over the snapshot table.
//!
//! Every operation returns a new vector and leaves its input untouched.
//! Sorting is descending and stable, so ties keep their input order, and
//! re-applying the same query to its own output returns it unchanged.

use crate::domain::snapshot::{Snapshot, Trend};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SectorFilter {
    #[default]
    Any,
    Only(String),
}

impl SectorFilter {
    fn matches(&self, snapshot: &Snapshot) -> bool {
        match self {
            SectorFilter::Any => true,
            SectorFilter::Only(sector) => snapshot.sector == *sector,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceFilter {
    #[default]
    Any,
    Up,
    Down,
    Flat,
}

impl PerformanceFilter {
    fn matches(&self, snapshot: &Snapshot) -> bool {
        match self {
            PerformanceFilter::Any => true,
            PerformanceFilter::Up => snapshot.trend() == Trend::Up,
            PerformanceFilter::Down => snapshot.trend() == Trend::Down,
            PerformanceFilter::Flat => snapshot.trend() == Trend::Flat,
        }
    }
}

impl FromStr for PerformanceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "all" => Ok(PerformanceFilter::Any),
            "up" => Ok(PerformanceFilter::Up),
            "down" => Ok(PerformanceFilter::Down),
            "flat" | "stable" => Ok(PerformanceFilter::Flat),
            other => Err(format!("unknown performance filter '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    ChangePct,
    Volume,
    MarketCap,
    Weight,
}

impl SortKey {
    fn compare(&self, a: &Snapshot, b: &Snapshot) -> Ordering {
        match self {
            SortKey::ChangePct => a.change_pct.total_cmp(&b.change_pct),
            SortKey::Volume => a.volume.cmp(&b.volume),
            SortKey::MarketCap => a.market_cap.total_cmp(&b.market_cap),
            SortKey::Weight => a.weight.total_cmp(&b.weight),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "change" | "change_pct" => Ok(SortKey::ChangePct),
            "volume" => Ok(SortKey::Volume),
            "market_cap" | "cap" => Ok(SortKey::MarketCap),
            "weight" => Ok(SortKey::Weight),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableQuery {
    pub sector: SectorFilter,
    pub performance: PerformanceFilter,
    pub sort: SortKey,
}

/// Sorts a copy of `rows` descending by `key`, keeping input order on ties.
pub fn sort_desc(rows: &[Snapshot], key: SortKey) -> Vec<Snapshot> {
    sort_desc_by(rows, &[key])
}

/// Descending by the first key, ties broken by the following keys in turn.
pub fn sort_desc_by(rows: &[Snapshot], keys: &[SortKey]) -> Vec<Snapshot> {
    let mut out = rows.to_vec();
    out.sort_by(|a, b| {
        keys.iter()
            .map(|k| k.compare(b, a))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    out
}

pub fn query(rows: &[Snapshot], q: &TableQuery) -> Vec<Snapshot> {
    let filtered: Vec<Snapshot> = rows
        .iter()
        .filter(|s| q.sector.matches(s) && q.performance.matches(s))
        .cloned()
        .collect();
    sort_desc(&filtered, q.sort)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenerCriteria {
    /// Currency units.
    pub min_market_cap: f64,
    /// Percent.
    pub min_dividend_yield: f64,
    pub min_change_pct: f64,
    /// Rows with unknown volatility fail an active limit.
    pub max_volatility_pct: Option<f64>,
    /// Empty means every sector.
    pub sectors: BTreeSet<String>,
}

impl ScreenerCriteria {
    pub fn matches(&self, s: &Snapshot) -> bool {
        let volatility_ok = match self.max_volatility_pct {
            None => true,
            Some(max) => s.volatility_pct.is_some_and(|v| v <= max),
        };
        s.market_cap >= self.min_market_cap
            && s.dividend_yield >= self.min_dividend_yield
            && s.change_pct >= self.min_change_pct
            && volatility_ok
            && (self.sectors.is_empty() || self.sectors.contains(&s.sector))
    }
}

/// Rows matching every criterion, in input order.
pub fn screen(rows: &[Snapshot], criteria: &ScreenerCriteria) -> Vec<Snapshot> {
    rows.iter().filter(|s| criteria.matches(s)).cloned().collect()
}

/// Up to `n` rows with the largest percent change, largest first.
pub fn top_gainers(rows: &[Snapshot], n: usize) -> Vec<Snapshot> {
    let mut out = sort_desc(rows, SortKey::ChangePct);
    out.truncate(n);
    out
}

/// Up to `n` rows with the smallest percent change, smallest first.
pub fn top_losers(rows: &[Snapshot], n: usize) -> Vec<Snapshot> {
    let mut out = rows.to_vec();
    out.sort_by(|a, b| a.change_pct.total_cmp(&b.change_pct));
    out.truncate(n);
    out
}
