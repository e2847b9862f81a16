//! Market data seam and series validation.
//!
//! The core never fetches, retries, or formats tickers. It consumes
//! validated series through the `MarketData` trait; implementations (CSV
//! files, an HTTP client, a test fixture) live with the caller.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum bar count for a series to be considered usable.
pub const MIN_BARS: usize = 5;

/// Requested history length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::ThreeYears => "3y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
        }
    }

    /// Approximate length in trading days, for providers that slice a
    /// longer series.
    pub fn approx_trading_days(self) -> usize {
        match self {
            Period::SixMonths => 126,
            Period::OneYear => 252,
            Period::TwoYears => 504,
            Period::ThreeYears => 756,
            Period::FiveYears => 1260,
            Period::TenYears => 2520,
        }
    }
}

/// Structured error types for data ingest, used by provider
/// implementations. Missing data is `None` at the trait surface, not an
/// error.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("could not read bars for '{ticker}': {reason}")]
    Unreadable { ticker: String, reason: String },

    #[error("malformed bar at line {line}: {reason}")]
    MalformedBar { line: usize, reason: String },

    #[error("series failed validation: {0}")]
    Validation(String),
}

/// Trait for market data sources.
///
/// Absent/unusable series are `None`; batch callers skip them and continue.
pub trait MarketData {
    /// Daily OHLCV bars for a ticker, ascending by date.
    fn daily_bars(&self, ticker: &str, period: Period) -> Option<Vec<Bar>>;

    /// Weekly bars, typically derived from the daily series by Friday
    /// aggregation.
    fn weekly_bars(&self, ticker: &str, period: Period) -> Option<Vec<Bar>>;
}

/// True iff the series is usable: enough bars, sane OHLC, strictly
/// ascending dates.
pub fn validate_series(bars: &[Bar], min_len: usize) -> bool {
    if bars.len() < min_len {
        return false;
    }
    if !bars.iter().all(Bar::is_sane) {
        return false;
    }
    bars.windows(2).all(|pair| pair[0].date < pair[1].date)
}
