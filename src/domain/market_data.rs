//! Provider payload types: lookback windows, fundamentals and the bulk result
//! of a single provider call.

use crate::domain::ohlcv::HistoricalBar;
use chrono::{Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookback {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    ThreeYears,
}

impl Lookback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lookback::OneDay => "1d",
            Lookback::FiveDays => "5d",
            Lookback::OneMonth => "1mo",
            Lookback::ThreeMonths => "3mo",
            Lookback::SixMonths => "6mo",
            Lookback::OneYear => "1y",
            Lookback::TwoYears => "2y",
            Lookback::ThreeYears => "3y",
        }
    }

    /// First calendar date covered when the window ends on `end`.
    ///
    /// `OneDay` covers only `end` itself; providers that apply it to a
    /// calendar window should fall back to their latest session.
    pub fn start_from(&self, end: NaiveDate) -> NaiveDate {
        let months = |n: u32| end.checked_sub_months(Months::new(n)).unwrap_or(NaiveDate::MIN);
        match self {
            Lookback::OneDay => end,
            Lookback::FiveDays => end - chrono::Duration::days(4),
            Lookback::OneMonth => months(1),
            Lookback::ThreeMonths => months(3),
            Lookback::SixMonths => months(6),
            Lookback::OneYear => months(12),
            Lookback::TwoYears => months(24),
            Lookback::ThreeYears => months(36),
        }
    }

    /// Approximate number of business days in the window.
    pub fn trading_days(&self) -> usize {
        match self {
            Lookback::OneDay => 1,
            Lookback::FiveDays => 5,
            Lookback::OneMonth => 21,
            Lookback::ThreeMonths => 63,
            Lookback::SixMonths => 126,
            Lookback::OneYear => 252,
            Lookback::TwoYears => 504,
            Lookback::ThreeYears => 756,
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Lookback::OneDay),
            "5d" => Ok(Lookback::FiveDays),
            "1mo" => Ok(Lookback::OneMonth),
            "3mo" => Ok(Lookback::ThreeMonths),
            "6mo" => Ok(Lookback::SixMonths),
            "1y" => Ok(Lookback::OneYear),
            "2y" => Ok(Lookback::TwoYears),
            "3y" => Ok(Lookback::ThreeYears),
            other => Err(format!("unknown lookback '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fundamentals {
    pub market_cap: Option<f64>,
    /// Dividend yield in percent.
    pub dividend_yield: Option<f64>,
}

/// Result of one provider call. Empty `bars` means no data is available now.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub bars: Vec<HistoricalBar>,
    pub fundamentals: Option<Fundamentals>,
}

impl MarketData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoricalBar> {
        self.bars.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_round_trip() {
        for lb in [
            Lookback::OneDay,
            Lookback::ThreeMonths,
            Lookback::SixMonths,
            Lookback::ThreeYears,
        ] {
            assert_eq!(lb.as_str().parse::<Lookback>().unwrap(), lb);
        }
        assert!("10y".parse::<Lookback>().is_err());
    }

    #[test]
    fn start_from_months_clamps_to_month_end() {
        assert_eq!(Lookback::OneMonth.start_from(d(2024, 3, 31)), d(2024, 2, 29));
        assert_eq!(Lookback::OneYear.start_from(d(2024, 6, 14)), d(2023, 6, 14));
        assert_eq!(Lookback::OneDay.start_from(d(2024, 6, 14)), d(2024, 6, 14));
        assert_eq!(Lookback::FiveDays.start_from(d(2024, 6, 14)), d(2024, 6, 10));
    }

    #[test]
    fn empty_market_data() {
        let data = MarketData::empty();
        assert!(data.is_empty());
        assert!(data.latest().is_none());
    }
}
