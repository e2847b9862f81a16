//! CSV-backed market data: one `<TICKER>.csv` file per instrument, with
//! `date,open,high,low,close,volume` columns, ascending by date.

use cacas_core::data::{resample_weekly, validate_series, DataError, MarketData, Period, MIN_BARS};
use cacas_core::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvBarRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Reads bar series from a directory of per-ticker CSV files.
pub struct CsvBars {
    data_dir: PathBuf,
}

impl CsvBars {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{ticker}.csv"))
    }

    /// Load the full daily series for a ticker.
    pub fn load(&self, ticker: &str) -> Result<Vec<Bar>, DataError> {
        let path = self.path_for(ticker);
        let mut reader = csv::Reader::from_path(&path).map_err(|e| DataError::Unreadable {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        })?;

        let mut bars = Vec::new();
        for (index, row) in reader.deserialize::<CsvBarRow>().enumerate() {
            let row = row.map_err(|e| DataError::MalformedBar {
                // +2: header line plus 1-based numbering.
                line: index + 2,
                reason: e.to_string(),
            })?;
            bars.push(Bar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        Ok(bars)
    }
}

/// Keep only the trailing bars covering the requested period.
fn trim_to_period(mut bars: Vec<Bar>, period: Period) -> Vec<Bar> {
    let keep = period.approx_trading_days();
    if bars.len() > keep {
        bars.drain(..bars.len() - keep);
    }
    bars
}

impl MarketData for CsvBars {
    fn daily_bars(&self, ticker: &str, period: Period) -> Option<Vec<Bar>> {
        let bars = trim_to_period(self.load(ticker).ok()?, period);
        validate_series(&bars, MIN_BARS).then_some(bars)
    }

    fn weekly_bars(&self, ticker: &str, period: Period) -> Option<Vec<Bar>> {
        let weekly = resample_weekly(&self.daily_bars(ticker, period)?);
        validate_series(&weekly, MIN_BARS).then_some(weekly)
    }
}
