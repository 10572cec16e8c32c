//! Table export port trait.

use crate::domain::error::DashboardError;
use crate::domain::sector::SectorSummary;
use crate::domain::snapshot::Snapshot;
use std::path::Path;

/// Port for writing derived tables to an output file.
pub trait ExportPort {
    fn write_snapshots(&self, rows: &[Snapshot], output_path: &Path) -> Result<(), DashboardError>;

    fn write_sectors(
        &self,
        sectors: &[SectorSummary],
        output_path: &Path,
    ) -> Result<(), DashboardError>;

    /// Default implementation: a screener result is a snapshot table.
    fn write_screen(&self, rows: &[Snapshot], output_path: &Path) -> Result<(), DashboardError> {
        self.write_snapshots(rows, output_path)
    }
}
