//! Core domain types and logic.

pub mod catalog;
pub mod config_validation;
pub mod correlation;
pub mod dashboard;
pub mod error;
pub mod indicator;
pub mod market_data;
pub mod ohlcv;
pub mod overview;
pub mod screener;
pub mod sector;
pub mod snapshot;
pub mod technical;
