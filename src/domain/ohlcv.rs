//! Historical OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl HistoricalBar {
    /// close - open
    pub fn change(&self) -> f64 {
        self.close - self.open
    }

    /// (close - open) / open * 100, zero when open is zero.
    pub fn change_pct(&self) -> f64 {
        guarded_pct(self.change(), self.open)
    }
}

/// `numerator / denominator * 100`, substituting zero when the denominator is
/// zero or either side is not finite.
pub fn guarded_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    numerator / denominator * 100.0
}

/// Sorts bars by date and drops later duplicates of the same date.
pub fn normalize_bars(bars: &mut Vec<HistoricalBar>) {
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
}
