//! Port traits: the seams between the domain and its adapters.

pub mod config_port;
pub mod export_port;
pub mod market_data_port;
