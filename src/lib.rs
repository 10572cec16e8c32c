//! cac40dash: market data model and aggregation for a CAC 40 dashboard.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`refresh`] drives the concurrent
//! fetch and the periodic refresh cycle.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod refresh;
pub mod cli;
