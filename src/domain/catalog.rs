//! Reference catalog of tracked instruments.
//!
//! The catalog is immutable once built. Instrument order is significant: it
//! drives the row order of every table derived from it, and sectors are
//! reported in order of first appearance.

use crate::domain::error::DashboardError;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub sub_sector: String,
    pub country: String,
    pub color: String,
    /// Index weight in percent.
    pub weight: f64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    instruments: Vec<Instrument>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, rejecting empty input, duplicate symbols and
    /// negative or non-finite weights.
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, DashboardError> {
        if instruments.is_empty() {
            return Err(DashboardError::Catalog {
                reason: "catalog has no instruments".into(),
            });
        }

        let mut index = HashMap::with_capacity(instruments.len());
        for (i, inst) in instruments.iter().enumerate() {
            if inst.symbol.trim().is_empty() {
                return Err(DashboardError::Catalog {
                    reason: format!("instrument at row {} has an empty symbol", i + 1),
                });
            }
            if !inst.weight.is_finite() || inst.weight < 0.0 {
                return Err(DashboardError::Catalog {
                    reason: format!("invalid weight {} for {}", inst.weight, inst.symbol),
                });
            }
            if index.insert(inst.symbol.clone(), i).is_some() {
                return Err(DashboardError::Catalog {
                    reason: format!("duplicate symbol: {}", inst.symbol),
                });
            }
        }

        Ok(Self { instruments, index })
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.index.get(symbol).map(|&i| &self.instruments[i])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.instruments.iter().map(|i| i.symbol.as_str())
    }

    /// Distinct sectors in order of first appearance.
    pub fn sectors(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.instruments
            .iter()
            .map(|i| i.sector.as_str())
            .filter(|s| seen.insert(*s))
            .collect()
    }

    pub fn members_of<'a>(&'a self, sector: &'a str) -> impl Iterator<Item = &'a Instrument> {
        self.instruments.iter().filter(move |i| i.sector == sector)
    }

    /// The built-in CAC 40 selection.
    pub fn cac40() -> Self {
        let instruments = CAC40
            .iter()
            .map(
                |&(symbol, name, sector, sub_sector, color, weight, description)| Instrument {
                    symbol: symbol.into(),
                    name: name.into(),
                    sector: sector.into(),
                    sub_sector: sub_sector.into(),
                    country: "France".into(),
                    color: color.into(),
                    weight,
                    description: description.into(),
                },
            )
            .collect();
        Self::new(instruments).expect("built-in catalog is valid")
    }
}

type CatalogRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    f64,
    &'static str,
);

const CAC40: &[CatalogRow] = &[
    ("MC.PA", "LVMH Moët Hennessy Louis Vuitton", "Luxe", "Articles de luxe", "#8B4513", 12.5, "Leader mondial du luxe"),
    ("TTE.PA", "TotalEnergies", "Énergie", "Pétrole & Gaz", "#FF6B00", 8.2, "Major énergétique intégré"),
    ("SAN.PA", "Sanofi", "Santé", "Pharmaceutique", "#0066CC", 7.8, "Groupe pharmaceutique mondial"),
    ("AIR.PA", "Airbus", "Industrie", "Aérospatial", "#003366", 6.5, "Constructeur aéronautique"),
    ("OR.PA", "L'Oréal", "Consommation", "Cosmétiques", "#FF69B4", 5.9, "Leader mondial des cosmétiques"),
    ("BNP.PA", "BNP Paribas", "Finance", "Banque", "#004B87", 5.2, "Groupe bancaire international"),
    ("AI.PA", "Air Liquide", "Chimie", "Gaz industriels", "#00A3E0", 4.8, "Leader des gaz industriels"),
    ("STM.PA", "STMicroelectronics", "Technologie", "Semi-conducteurs", "#660099", 4.3, "Fabricant de semi-conducteurs"),
    ("DG.PA", "Vinci", "Industrie", "BTP & Concessions", "#FFCC00", 4.1, "Groupe de construction et concessions"),
    ("RI.PA", "Pernod Ricard", "Consommation", "Spiritueux", "#8B0000", 3.9, "Leader mondial des vins et spiritueux"),
    ("SU.PA", "Schneider Electric", "Industrie", "Équipements électriques", "#00A3E0", 3.7, "Spécialiste de la gestion d'énergie"),
    ("CAP.PA", "Capgemini", "Technologie", "Services informatiques", "#F26522", 3.5, "Services conseil en technologies"),
    ("ACA.PA", "Crédit Agricole", "Finance", "Banque", "#004B87", 3.3, "Groupe bancaire coopératif"),
    ("ML.PA", "Michelin", "Industrie", "Pneumatiques", "#FF0000", 3.1, "Manufacturier de pneumatiques"),
    ("ENGI.PA", "Engie", "Énergie", "Électricité & Gaz", "#00A3E0", 2.9, "Fournisseur d'énergie"),
];
