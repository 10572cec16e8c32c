//! Technical series over one instrument's history.
//!
//! - `IndicatorPoint`: a single dated value, absent during warmup
//! - `IndicatorType`: indicator identity + parameters (usable as a map key)
//! - `IndicatorSeries`: a series aligned one-to-one with the input bars

pub mod returns;
pub mod sma;
pub mod stddev;

use chrono::NaiveDate;
use std::fmt;

/// Short moving-average window.
pub const SHORT_WINDOW: usize = 20;
/// Long moving-average window.
pub const LONG_WINDOW: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Stddev(usize),
    Return,
    CumulativeReturn,
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Return => write!(f, "RETURN"),
            IndicatorType::CumulativeReturn => write!(f, "CUMRETURN"),
        }
    }
}
