//! Sector aggregation over the catalog and the current snapshot table.

use crate::domain::catalog::Catalog;
use crate::domain::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct SectorSummary {
    pub sector: String,
    /// Sum of catalog weights, known with or without live data.
    pub total_weight: f64,
    /// Sum of snapshot market caps; zero when no member reported.
    pub total_market_cap: f64,
    pub total_volume: i64,
    /// Catalog members.
    pub member_count: usize,
    /// Members present in the snapshot table.
    pub reporting_count: usize,
    /// Mean percent change over reporting members; zero when none reported.
    pub mean_change_pct: f64,
}

/// One summary per catalog sector, in catalog order, including sectors with
/// no current snapshots.
pub fn summarize_sectors(catalog: &Catalog, snapshots: &[Snapshot]) -> Vec<SectorSummary> {
    catalog
        .sectors()
        .into_iter()
        .map(|sector| {
            let total_weight: f64 = catalog.members_of(sector).map(|i| i.weight).sum();
            let member_count = catalog.members_of(sector).count();

            let reporting: Vec<&Snapshot> = snapshots
                .iter()
                .filter(|s| s.sector == sector && catalog.contains(&s.symbol))
                .collect();

            let total_market_cap = reporting.iter().map(|s| s.market_cap).sum();
            let total_volume = reporting.iter().map(|s| s.volume).sum();
            let mean_change_pct = if reporting.is_empty() {
                0.0
            } else {
                reporting.iter().map(|s| s.change_pct).sum::<f64>() / reporting.len() as f64
            };

            SectorSummary {
                sector: sector.to_string(),
                total_weight,
                total_market_cap,
                total_volume,
                member_count,
                reporting_count: reporting.len(),
                mean_change_pct,
            }
        })
        .collect()
}

/// Snapshot rows belonging to one sector, in table order.
pub fn sector_members<'a>(snapshots: &'a [Snapshot], sector: &str) -> Vec<&'a Snapshot> {
    snapshots.iter().filter(|s| s.sector == sector).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;

    fn snap(symbol: &str, sector: &str, change_pct: f64, market_cap: f64) -> Snapshot {
        Snapshot {
            symbol: symbol.into(),
            name: symbol.into(),
            sector: sector.into(),
            price: 100.0,
            open: 100.0,
            high: 101.0,
            low: 99.0,
            volume: 10,
            change: change_pct,
            change_pct,
            market_cap,
            dividend_yield: 0.0,
            weight: 1.0,
            volatility_pct: None,
        }
    }

    #[test]
    fn weights_come_from_catalog_regardless_of_snapshots() {
        let catalog = Catalog::cac40();
        let summaries = summarize_sectors(&catalog, &[]);

        assert_eq!(summaries.len(), 8);
        let industrie = summaries.iter().find(|s| s.sector == "Industrie").unwrap();
        assert!((industrie.total_weight - (6.5 + 4.1 + 3.7 + 3.1)).abs() < 1e-9);
        assert_eq!(industrie.member_count, 4);
        assert_eq!(industrie.reporting_count, 0);
        assert_eq!(industrie.total_market_cap, 0.0);
        assert_eq!(industrie.mean_change_pct, 0.0);
    }

    #[test]
    fn means_and_totals_over_reporting_members() {
        let catalog = Catalog::cac40();
        let snapshots = vec![
            snap("AIR.PA", "Industrie", 2.0, 100.0),
            snap("DG.PA", "Industrie", -1.0, 50.0),
            snap("MC.PA", "Luxe", 0.5, 300.0),
        ];
        let summaries = summarize_sectors(&catalog, &snapshots);

        let industrie = summaries.iter().find(|s| s.sector == "Industrie").unwrap();
        assert_eq!(industrie.reporting_count, 2);
        assert!((industrie.mean_change_pct - 0.5).abs() < 1e-12);
        assert!((industrie.total_market_cap - 150.0).abs() < 1e-12);
        assert_eq!(industrie.total_volume, 20);

        let luxe = summaries.iter().find(|s| s.sector == "Luxe").unwrap();
        assert!((luxe.mean_change_pct - 0.5).abs() < 1e-12);
        assert!((luxe.total_weight - 12.5).abs() < 1e-12);
    }

    #[test]
    fn sector_members_filters() {
        let snapshots = vec![
            snap("AIR.PA", "Industrie", 2.0, 100.0),
            snap("MC.PA", "Luxe", 0.5, 300.0),
        ];
        let members = sector_members(&snapshots, "Luxe");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].symbol, "MC.PA");
    }
}
