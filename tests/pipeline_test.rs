//! End-to-end pipeline tests against an in-memory provider.
//!
//! Tests cover:
//! - Snapshot table, sector summaries and rankings after a partial outage
//! - Query ordering and idempotence over a refreshed dashboard
//! - Technical, volatility and correlation views from provider histories
//! - Concurrent fetch matching the sequential aggregation

mod common;

use approx::assert_relative_eq;
use cac40dash::domain::catalog::Catalog;
use cac40dash::domain::dashboard::Dashboard;
use cac40dash::domain::error::DashboardError;
use cac40dash::domain::market_data::Lookback;
use cac40dash::domain::screener::{
    query, sort_desc_by, top_gainers, top_losers, PerformanceFilter, ScreenerCriteria,
    SectorFilter, SortKey, TableQuery,
};
use cac40dash::domain::snapshot::{aggregate_snapshots, SkipReason, Trend};
use cac40dash::domain::technical::technical_view;
use cac40dash::refresh::{fetch_all, FetchOptions};
use common::*;
use std::sync::Arc;

fn abc_provider() -> MockProvider {
    MockProvider::new()
        .with_session("A", 100.0, 102.0)
        .with_session("B", 100.0, 105.0)
        .with_session("C", 100.0, 99.0)
        .with_fundamentals("A", 20e9, 3.0)
        .with_fundamentals("B", 50e9, 1.0)
        .with_fundamentals("C", 30e9, 4.0)
}

mod missing_instrument {
    use super::*;

    fn provider_without_b() -> MockProvider {
        MockProvider::new()
            .with_session("A", 100.0, 102.0)
            .with_session("C", 100.0, 99.0)
    }

    #[test]
    fn counts_in_sector_weight_but_not_in_table() {
        let mut dashboard = Dashboard::new(small_catalog());
        dashboard.refresh(&provider_without_b());

        assert_eq!(dashboard.snapshots().len(), 2);
        assert!(dashboard.snapshot_table().get("B").is_none());
        let skipped = &dashboard.snapshot_table().skipped;
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].symbol, "B");
        assert_eq!(skipped[0].reason, SkipReason::NoData);

        let luxe = &dashboard.sectors()[0];
        assert_eq!(luxe.sector, "Luxe");
        assert_relative_eq!(luxe.total_weight, 8.0);
        assert_eq!(luxe.member_count, 2);
        assert_eq!(luxe.reporting_count, 1);
        assert_relative_eq!(luxe.mean_change_pct, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn absent_from_rankings() {
        let mut dashboard = Dashboard::new(small_catalog());
        dashboard.refresh(&provider_without_b());

        let gainers = top_gainers(dashboard.snapshots(), 10);
        let losers = top_losers(dashboard.snapshots(), 10);
        assert!(gainers.iter().all(|s| s.symbol != "B"));
        assert!(losers.iter().all(|s| s.symbol != "B"));
        let ranked = dashboard.query(&TableQuery::default());
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn provider_error_is_fail_soft() {
        let provider = abc_provider().with_error("A", "connection reset");
        let table = aggregate_snapshots(&small_catalog(), &provider);
        assert_eq!(table.len(), 2);
        assert!(
            matches!(&table.skipped[0].reason, SkipReason::ProviderError(e) if e.contains("connection reset"))
        );
    }

    #[test]
    fn sector_weight_independent_of_availability() {
        let catalog = Catalog::cac40();
        let empty = Dashboard::new(catalog.clone());
        let mut full = Dashboard::new(catalog.clone());
        let provider = catalog
            .symbols()
            .fold(MockProvider::new(), |p, s| p.with_session(s, 10.0, 11.0));
        full.refresh(&provider);

        assert_eq!(full.snapshots().len(), catalog.len());
        for (a, b) in empty.sectors().iter().zip(full.sectors()) {
            assert_eq!(a.sector, b.sector);
            assert_relative_eq!(a.total_weight, b.total_weight);
            let from_catalog: f64 = catalog.members_of(&a.sector).map(|i| i.weight).sum();
            assert_relative_eq!(a.total_weight, from_catalog);
        }
    }
}

mod queries {
    use super::*;

    fn symbols(rows: &[cac40dash::domain::snapshot::Snapshot]) -> Vec<String> {
        rows.iter().map(|s| s.symbol.clone()).collect()
    }

    #[test]
    fn change_then_volume_orders_b_a_c() {
        let mut dashboard = Dashboard::new(small_catalog());
        dashboard.refresh(&abc_provider());

        let rows = sort_desc_by(dashboard.snapshots(), &[SortKey::ChangePct, SortKey::Volume]);
        assert_eq!(symbols(&rows), vec!["B", "A", "C"]);
        assert_eq!(symbols(&dashboard.query(&TableQuery::default())), vec!["B", "A", "C"]);
    }

    #[test]
    fn query_is_idempotent_on_dashboard_rows() {
        let mut dashboard = Dashboard::new(small_catalog());
        dashboard.refresh(&abc_provider());

        let q = TableQuery {
            sector: SectorFilter::Only("Luxe".into()),
            performance: PerformanceFilter::Up,
            sort: SortKey::MarketCap,
        };
        let once = dashboard.query(&q);
        let twice = query(&once, &q);
        assert_eq!(once, twice);
        assert_eq!(symbols(&once), vec!["B", "A"]);
    }

    #[test]
    fn screen_uses_fundamentals() {
        let mut dashboard = Dashboard::new(small_catalog());
        dashboard.refresh(&abc_provider());

        let criteria = ScreenerCriteria {
            min_market_cap: 10e9,
            min_dividend_yield: 2.0,
            ..ScreenerCriteria::default()
        };
        assert_eq!(symbols(&dashboard.screen(&criteria)), vec!["A"]);
    }

    #[test]
    fn percent_change_guarded_for_zero_open() {
        let provider = MockProvider::new()
            .with_session("A", 0.0, 5.0)
            .with_session("B", 50.0, 50.0)
            .with_session("C", 80.0, 60.0);
        let table = aggregate_snapshots(&small_catalog(), &provider);

        assert_eq!(table.rows[0].change_pct, 0.0);
        assert_relative_eq!(table.rows[0].change, 5.0);
        assert_eq!(table.rows[1].trend(), Trend::Flat);
        assert_relative_eq!(table.rows[2].change_pct, -25.0);
    }
}

mod histories {
    use super::*;

    fn rising(symbol: &str, n: usize) -> Vec<HistoricalBar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        bars_from_closes(symbol, "2024-01-01", &closes)
    }

    #[test]
    fn technical_view_sma_prefix_absent() {
        let bars = rising("A", 60);
        let view = technical_view("A", &bars);

        assert_eq!(view.sma_short.len(), 60);
        assert!((0..19).all(|i| view.sma_short.value_at(i).is_none()));
        assert_relative_eq!(view.sma_short.value_at(19).unwrap(), 109.5);
        assert!((0..49).all(|i| view.sma_long.value_at(i).is_none()));
        assert_relative_eq!(view.sma_long.value_at(59).unwrap(), 134.5);
    }

    #[test]
    fn history_errors() {
        let dashboard = Dashboard::new(small_catalog());
        let provider = MockProvider::new().with_bars("A", rising("A", 5));

        assert!(matches!(
            dashboard.history(&provider, "ZZZ", Lookback::OneYear),
            Err(DashboardError::UnknownSymbol { .. })
        ));
        assert!(matches!(
            dashboard.history(&provider, "B", Lookback::OneYear),
            Err(DashboardError::NoData { .. })
        ));
        assert_eq!(dashboard.history(&provider, "A", Lookback::OneYear).unwrap().len(), 5);
    }

    #[test]
    fn correlation_self_and_symmetry() {
        let dashboard = Dashboard::new(small_catalog());
        let a = bars_from_closes("A", "2024-01-01", &[1.0, 2.0, 3.0, 2.0, 5.0]);
        let b = bars_from_closes("B", "2024-01-01", &[2.0, 1.0, 4.0, 3.0, 3.0]);
        let c = bars_from_closes("C", "2024-01-03", &[7.0, 7.0, 7.0]);
        let provider = MockProvider::new()
            .with_bars("A", a)
            .with_bars("B", b)
            .with_bars("C", c);

        let matrix = dashboard.correlation(&provider, Lookback::OneYear, 3);
        assert_eq!(matrix.len(), 3);
        assert_relative_eq!(matrix.get("A", "A").unwrap(), 1.0, epsilon = 1e-12);
        let ab = matrix.get("A", "B").unwrap();
        let ba = matrix.get("B", "A").unwrap();
        assert_relative_eq!(ab, ba, epsilon = 1e-12);
        assert!(ab > 0.0 && ab < 1.0);
        // constant series has no variance
        assert_eq!(matrix.get("A", "C"), None);
        assert_eq!(matrix.get("C", "C"), None);
    }

    #[test]
    fn volatility_attached_for_screener() {
        let mut dashboard = Dashboard::new(small_catalog());
        let provider = MockProvider::new()
            .with_bars("A", bars_from_closes("A", "2024-01-01", &[100.0, 100.0, 100.0]))
            .with_bars("B", bars_from_closes("B", "2024-01-01", &[80.0, 100.0, 120.0]))
            .with_fundamentals("A", 1.0, 0.0)
            .with_fundamentals("B", 1.0, 0.0);
        dashboard.refresh(&provider);

        let profiles = dashboard.volatility_profiles(&provider, Lookback::OneYear);
        assert_eq!(profiles.len(), 2);
        assert_relative_eq!(profiles[1].volatility, 20.0);
        dashboard.attach_volatility(&profiles);

        let criteria = ScreenerCriteria {
            min_change_pct: f64::NEG_INFINITY,
            max_volatility_pct: Some(5.0),
            ..ScreenerCriteria::default()
        };
        let rows = dashboard.screen(&criteria);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "A");
        assert_eq!(rows[0].volatility_pct, Some(0.0));
    }
}

mod concurrent {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn matches_sequential_aggregation() {
        let catalog = small_catalog();
        let sequential = aggregate_snapshots(&catalog, &abc_provider());
        let provider = Arc::new(abc_provider().with_error("C", "down"));

        let concurrent = fetch_all(&catalog, provider.clone(), Lookback::OneDay, FetchOptions::default()).await;

        assert_eq!(provider.call_count(), 3);
        assert_eq!(concurrent.rows, sequential.rows[..2].to_vec());
        assert_eq!(concurrent.skipped.len(), 1);
        assert_eq!(concurrent.skipped[0].symbol, "C");
    }
}
