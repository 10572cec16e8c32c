//! Rolling standard deviation of close.
//!
//! Sample standard deviation (divisor n-1) over a trailing window of n closes.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n - 1))
//! Warmup: the first (n-1) points are absent; n < 2 yields no values.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::HistoricalBar;

/// Sample standard deviation; `None` for fewer than two values.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    Some(variance.sqrt())
}

pub fn calculate_stddev(bars: &[HistoricalBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    for i in 0..bars.len() {
        let value = if period >= 2 && i + 1 >= period {
            sample_stddev(&closes[i + 1 - period..=i])
        } else {
            None
        };

        values.push(IndicatorPoint {
            date: bars[i].date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}
