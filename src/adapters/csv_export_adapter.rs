//! CSV export of snapshot and sector tables.

use crate::domain::error::DashboardError;
use crate::domain::sector::SectorSummary;
use crate::domain::snapshot::Snapshot;
use crate::ports::export_port::ExportPort;
use serde::Serialize;
use std::path::Path;

pub struct CsvExportAdapter;

#[derive(Serialize)]
struct SnapshotRecord<'a> {
    symbol: &'a str,
    name: &'a str,
    sector: &'a str,
    price: f64,
    open: f64,
    high: f64,
    low: f64,
    volume: i64,
    change: f64,
    change_pct: f64,
    market_cap: f64,
    dividend_yield: f64,
    weight: f64,
    volatility_pct: Option<f64>,
}

impl<'a> From<&'a Snapshot> for SnapshotRecord<'a> {
    fn from(s: &'a Snapshot) -> Self {
        Self {
            symbol: &s.symbol,
            name: &s.name,
            sector: &s.sector,
            price: s.price,
            open: s.open,
            high: s.high,
            low: s.low,
            volume: s.volume,
            change: s.change,
            change_pct: s.change_pct,
            market_cap: s.market_cap,
            dividend_yield: s.dividend_yield,
            weight: s.weight,
            volatility_pct: s.volatility_pct,
        }
    }
}

#[derive(Serialize)]
struct SectorRecord<'a> {
    sector: &'a str,
    total_weight: f64,
    total_market_cap: f64,
    total_volume: i64,
    member_count: usize,
    reporting_count: usize,
    mean_change_pct: f64,
}

fn export_error(path: &Path, e: impl std::fmt::Display) -> DashboardError {
    DashboardError::Export {
        reason: format!("{}: {}", path.display(), e),
    }
}

fn write_records<T: Serialize>(
    records: impl IntoIterator<Item = T>,
    output_path: &Path,
) -> Result<(), DashboardError> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(|e| export_error(output_path, e))?;
    for record in records {
        wtr.serialize(record)
            .map_err(|e| export_error(output_path, e))?;
    }
    wtr.flush().map_err(|e| export_error(output_path, e))
}

impl ExportPort for CsvExportAdapter {
    fn write_snapshots(&self, rows: &[Snapshot], output_path: &Path) -> Result<(), DashboardError> {
        write_records(rows.iter().map(SnapshotRecord::from), output_path)
    }

    fn write_sectors(
        &self,
        sectors: &[SectorSummary],
        output_path: &Path,
    ) -> Result<(), DashboardError> {
        let records = sectors.iter().map(|s| SectorRecord {
            sector: &s.sector,
            total_weight: s.total_weight,
            total_market_cap: s.total_market_cap,
            total_volume: s.total_volume,
            member_count: s.member_count,
            reporting_count: s.reporting_count,
            mean_change_pct: s.mean_change_pct,
        });
        write_records(records, output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn snapshot(symbol: &str, change_pct: f64) -> Snapshot {
        Snapshot {
            symbol: symbol.into(),
            name: format!("{symbol} SA"),
            sector: "Luxe".into(),
            price: 101.0,
            open: 100.0,
            high: 102.0,
            low: 99.0,
            volume: 1200,
            change: 1.0,
            change_pct,
            market_cap: 5e9,
            dividend_yield: 2.5,
            weight: 3.0,
            volatility_pct: None,
        }
    }

    #[test]
    fn writes_snapshot_rows_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.csv");
        CsvExportAdapter
            .write_snapshots(&[snapshot("MC.PA", 1.0), snapshot("RMS.PA", -0.5)], &path)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("symbol,name,sector,price"));
        assert!(lines[0].ends_with("volatility_pct"));
        assert!(lines[1].starts_with("MC.PA,MC.PA SA,Luxe,101.0"));
        assert!(lines[2].contains(",-0.5,"));
    }

    #[test]
    fn writes_sector_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sectors.csv");
        let summary = SectorSummary {
            sector: "Énergie".into(),
            total_weight: 8.5,
            total_market_cap: 0.0,
            total_volume: 0,
            member_count: 1,
            reporting_count: 0,
            mean_change_pct: 0.0,
        };
        CsvExportAdapter.write_sectors(&[summary], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().nth(1),
            Some("Énergie,8.5,0.0,0,1,0,0.0")
        );
    }

    #[test]
    fn unwritable_path_is_export_error() {
        let result = CsvExportAdapter.write_snapshots(&[], Path::new("/nonexistent/dir/out.csv"));
        assert!(matches!(result, Err(DashboardError::Export { .. })));
    }
}
