//! Historical volatility annotator.
//!
//! Log returns ln(close[t]/close[t-1]), rolling sample standard deviation
//! over monthly/quarterly/yearly windows, annualized as std·√252·100
//! (percent).

use crate::frame::{ChannelFrame, VolatilityColumns};
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Window lengths for the three volatility horizons, in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilityWindows {
    pub monthly: usize,
    pub quarterly: usize,
    pub yearly: usize,
}

impl Default for VolatilityWindows {
    fn default() -> Self {
        Self {
            monthly: 21,
            quarterly: 63,
            yearly: 252,
        }
    }
}

/// Log return series. NaN at bar 0 and wherever a close is non-positive.
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    for i in 1..n {
        if closes[i] > 0.0 && closes[i - 1] > 0.0 {
            result[i] = (closes[i] / closes[i - 1]).ln();
        }
    }
    result
}

/// Rolling sample standard deviation. NaN until the window is full; NaN
/// inputs inside the window poison the output bar.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period < 2 {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance =
            window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        result[i] = variance.sqrt();
    }

    result
}

/// Attach annualized historical volatility columns to a frame.
pub fn annotate_volatility(frame: &mut ChannelFrame, windows: VolatilityWindows) {
    let closes: Vec<f64> = frame.bars().iter().map(|b| b.close).collect();
    let returns = log_returns(&closes);

    let annualize = |std_series: Vec<f64>| -> Vec<f64> {
        std_series
            .into_iter()
            .map(|v| v * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
            .collect()
    };

    frame.volatility = Some(VolatilityColumns {
        monthly: annualize(rolling_std(&returns, windows.monthly)),
        quarterly: annualize(rolling_std(&returns, windows.quarterly)),
        yearly: annualize(rolling_std(&returns, windows.yearly)),
    });
}
