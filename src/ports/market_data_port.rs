//! Market data provider port trait.

use crate::domain::error::DashboardError;
use crate::domain::market_data::{Lookback, MarketData};

/// One-shot bulk fetch of history and fundamentals for a symbol.
///
/// Implementations return bars sorted by date with no duplicate dates. An
/// empty result and an error are both treated as "no data" by the
/// aggregators; the error only carries a reason for the log.
pub trait MarketDataPort {
    fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<MarketData, DashboardError>;

    /// Called once before each periodic refresh cycle.
    fn begin_cycle(&self) {}
}

impl<T: MarketDataPort + ?Sized> MarketDataPort for &T {
    fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<MarketData, DashboardError> {
        (**self).fetch(symbol, lookback)
    }

    fn begin_cycle(&self) {
        (**self).begin_cycle()
    }
}

impl<T: MarketDataPort + ?Sized> MarketDataPort for std::sync::Arc<T> {
    fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<MarketData, DashboardError> {
        (**self).fetch(symbol, lookback)
    }

    fn begin_cycle(&self) {
        (**self).begin_cycle()
    }
}
