//! Dashboard context: the catalog plus every table derived from the latest
//! refresh. Each refresh replaces the tables wholesale.

use crate::domain::catalog::Catalog;
use crate::domain::correlation::{correlation_matrix, CorrelationMatrix};
use crate::domain::error::DashboardError;
use crate::domain::market_data::Lookback;
use crate::domain::ohlcv::HistoricalBar;
use crate::domain::overview::KeyMetrics;
use crate::domain::screener::{self, ScreenerCriteria, TableQuery};
use crate::domain::sector::{summarize_sectors, SectorSummary};
use crate::domain::snapshot::{aggregate_snapshots, Snapshot, SnapshotTable};
use crate::domain::technical::{
    monthly_returns, sector_evolution, volatility_profile, MonthlyHeatmap, SectorMonthPoint,
    VolatilityProfile,
};
use crate::ports::market_data_port::MarketDataPort;
use chrono::{DateTime, Local};
use log::{info, warn};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Dashboard {
    catalog: Catalog,
    snapshots: SnapshotTable,
    sectors: Vec<SectorSummary>,
    last_refresh: Option<DateTime<Local>>,
    cycles: u64,
    index_symbol: Option<String>,
}

impl Dashboard {
    /// A dashboard with no live data yet; sector weights are already known.
    pub fn new(catalog: Catalog) -> Self {
        let sectors = summarize_sectors(&catalog, &[]);
        Self {
            catalog,
            snapshots: SnapshotTable::default(),
            sectors,
            last_refresh: None,
            cycles: 0,
            index_symbol: None,
        }
    }

    /// Lets [`Dashboard::history`] serve the benchmark index alongside the
    /// catalog instruments.
    pub fn with_index(mut self, symbol: &str) -> Self {
        self.index_symbol = Some(symbol.to_string());
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots.rows
    }

    pub fn snapshot_table(&self) -> &SnapshotTable {
        &self.snapshots
    }

    pub fn sectors(&self) -> &[SectorSummary] {
        &self.sectors
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Fetches snapshots sequentially and recomputes every aggregate.
    pub fn refresh(&mut self, provider: &dyn MarketDataPort) {
        let table = aggregate_snapshots(&self.catalog, provider);
        self.apply(table);
    }

    /// Replaces the snapshot table and recomputes the sector summaries.
    pub fn apply(&mut self, table: SnapshotTable) {
        self.sectors = summarize_sectors(&self.catalog, &table.rows);
        self.snapshots = table;
        self.last_refresh = Some(Local::now());
        self.cycles += 1;
        info!(
            "refresh #{}: {} of {} instruments reporting",
            self.cycles,
            self.snapshots.len(),
            self.catalog.len()
        );
    }

    /// Copies volatility percent from `profiles` onto matching snapshot rows.
    pub fn attach_volatility(&mut self, profiles: &[VolatilityProfile]) {
        let by_symbol: HashMap<&str, f64> = profiles
            .iter()
            .map(|p| (p.symbol.as_str(), p.volatility_pct))
            .collect();
        for row in &mut self.snapshots.rows {
            row.volatility_pct = by_symbol.get(row.symbol.as_str()).copied();
        }
    }

    pub fn key_metrics(&self) -> KeyMetrics {
        KeyMetrics::compute(&self.snapshots.rows)
    }

    pub fn query(&self, q: &TableQuery) -> Vec<Snapshot> {
        screener::query(&self.snapshots.rows, q)
    }

    pub fn screen(&self, criteria: &ScreenerCriteria) -> Vec<Snapshot> {
        screener::screen(&self.snapshots.rows, criteria)
    }

    /// Computes volatility over `lookback` when `criteria` has an active
    /// volatility limit, then screens.
    pub fn screen_with_volatility(
        &mut self,
        provider: &dyn MarketDataPort,
        lookback: Lookback,
        criteria: &ScreenerCriteria,
    ) -> Vec<Snapshot> {
        if criteria.max_volatility_pct.is_some() {
            let profiles = self.volatility_profiles(provider, lookback);
            self.attach_volatility(&profiles);
        }
        self.screen(criteria)
    }

    /// History for one catalog instrument or the benchmark index.
    pub fn history(
        &self,
        provider: &dyn MarketDataPort,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<Vec<HistoricalBar>, DashboardError> {
        let is_index = self.index_symbol.as_deref() == Some(symbol);
        if !is_index && !self.catalog.contains(symbol) {
            return Err(DashboardError::UnknownSymbol {
                symbol: symbol.to_string(),
            });
        }
        let data = provider.fetch(symbol, lookback)?;
        if data.is_empty() {
            return Err(DashboardError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(data.bars)
    }

    /// Histories for the first `limit` catalog instruments, skipping failures.
    pub fn histories(
        &self,
        provider: &dyn MarketDataPort,
        lookback: Lookback,
        limit: usize,
    ) -> Vec<(String, Vec<HistoricalBar>)> {
        self.catalog
            .symbols()
            .take(limit)
            .filter_map(|symbol| match self.history(provider, symbol, lookback) {
                Ok(bars) => Some((symbol.to_string(), bars)),
                Err(e) => {
                    warn!("skipping {} history ({})", symbol, e);
                    None
                }
            })
            .collect()
    }

    pub fn volatility_profiles(
        &self,
        provider: &dyn MarketDataPort,
        lookback: Lookback,
    ) -> Vec<VolatilityProfile> {
        self.histories(provider, lookback, self.catalog.len())
            .iter()
            .filter_map(|(symbol, bars)| volatility_profile(symbol, bars))
            .collect()
    }

    pub fn correlation(
        &self,
        provider: &dyn MarketDataPort,
        lookback: Lookback,
        limit: usize,
    ) -> CorrelationMatrix {
        correlation_matrix(&self.histories(provider, lookback, limit))
    }

    pub fn monthly_heatmap(
        &self,
        provider: &dyn MarketDataPort,
        lookback: Lookback,
        limit: usize,
    ) -> MonthlyHeatmap {
        let per_instrument: Vec<_> = self
            .histories(provider, lookback, limit)
            .iter()
            .map(|(_, bars)| monthly_returns(bars))
            .collect();
        MonthlyHeatmap::build(&per_instrument)
    }

    pub fn sector_evolution(
        &self,
        provider: &dyn MarketDataPort,
        lookback: Lookback,
    ) -> Vec<SectorMonthPoint> {
        let histories: HashMap<String, Vec<HistoricalBar>> = self
            .histories(provider, lookback, self.catalog.len())
            .into_iter()
            .collect();
        sector_evolution(&self.catalog, &histories)
    }
}
