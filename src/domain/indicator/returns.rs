//! Period and cumulative percent returns.
//!
//! RETURN[t] = (C[t] / C[t-1] - 1) * 100, absent at t = 0 or when C[t-1] is 0.
//! CUMRETURN[t] = sum of RETURN[1..=t]. This is the additive approximation of
//! compounded return, not the compounded product.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::HistoricalBar;

/// Percent change between consecutive values; `None` where undefined.
pub fn pct_changes(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let ret = if i == 0 || values[i - 1] == 0.0 {
            None
        } else {
            Some((values[i] / values[i - 1] - 1.0) * 100.0)
        };
        out.push(ret);
    }
    out
}

pub fn calculate_returns(bars: &[HistoricalBar]) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = bars
        .iter()
        .zip(pct_changes(&closes))
        .map(|(bar, value)| IndicatorPoint {
            date: bar.date,
            value,
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Return,
        values,
    }
}

/// Running sum of period returns. Undefined periods are skipped by the sum,
/// so only the leading points before the first defined return are absent.
pub fn calculate_cumulative_returns(bars: &[HistoricalBar]) -> IndicatorSeries {
    let returns = calculate_returns(bars);
    let mut running: Option<f64> = None;

    let values = returns
        .values
        .into_iter()
        .map(|point| {
            if let Some(r) = point.value {
                running = Some(running.unwrap_or(0.0) + r);
            }
            IndicatorPoint {
                date: point.date,
                value: running,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::CumulativeReturn,
        values,
    }
}
