//! Simple Moving Average of close.
//!
//! SMA(n)[i] = sum(C[i-n+1..=i]) / n, trailing.
//! Warmup: the first (n-1) points are absent.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::HistoricalBar;

pub fn calculate_sma(bars: &[HistoricalBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let value = if period > 0 && i + 1 >= period {
            let window = &bars[i + 1 - period..=i];
            Some(window.iter().map(|b| b.close).sum::<f64>() / period as f64)
        } else {
            None
        };

        values.push(IndicatorPoint {
            date: bars[i].date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
