//! Pairwise Pearson correlation of close series aligned by date.
//!
//! Each pair uses only the dates both series share (pairwise-complete
//! observations). A pair with fewer than two shared dates, or with zero
//! variance on the shared dates, has no correlation.

use crate::domain::ohlcv::HistoricalBar;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.values[i][j]
    }

    pub fn row(&self, i: usize) -> &[Option<f64>] {
        &self.values[i]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Pearson correlation of two equally long samples.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

fn aligned(a: &HashMap<NaiveDate, f64>, b: &HashMap<NaiveDate, f64>) -> (Vec<f64>, Vec<f64>) {
    let mut dates: Vec<&NaiveDate> = a.keys().filter(|d| b.contains_key(*d)).collect();
    dates.sort();
    dates.into_iter().map(|d| (a[d], b[d])).unzip()
}

/// Correlation matrix over `(symbol, bars)` pairs, in input order.
pub fn correlation_matrix(series: &[(String, Vec<HistoricalBar>)]) -> CorrelationMatrix {
    let by_date: Vec<HashMap<NaiveDate, f64>> = series
        .iter()
        .map(|(_, bars)| bars.iter().map(|b| (b.date, b.close)).collect())
        .collect();

    let n = series.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let (x, y) = aligned(&by_date[i], &by_date[j]);
            let r = if i == j {
                pearson(&x, &y).map(|_| 1.0)
            } else {
                pearson(&x, &y)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        symbols: series.iter().map(|(s, _)| s.clone()).collect(),
        values,
    }
}
