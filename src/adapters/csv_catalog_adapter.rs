//! Loads a reference catalog from CSV.
//!
//! Columns: `symbol,name,sector,sub_sector,country,color,weight,description`.

use crate::domain::catalog::{Catalog, Instrument};
use crate::domain::error::DashboardError;
use std::path::Path;

pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, DashboardError> {
    let path = path.as_ref();
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DashboardError::Catalog {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
    read_catalog(rdr)
}

pub fn parse_catalog(content: &str) -> Result<Catalog, DashboardError> {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    read_catalog(rdr)
}

fn read_catalog<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<Catalog, DashboardError> {
    let instruments = rdr
        .deserialize::<Instrument>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| DashboardError::Catalog {
                reason: format!("row {}: {}", i + 1, e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::new(instruments)
}
