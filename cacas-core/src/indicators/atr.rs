//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR is a simple rolling mean of True Range over `period`.
//! TR is undefined at bar 0 (no previous close), so ATR is undefined for
//! the first `period` bars.

use crate::domain::Bar;

/// Default ATR lookback used by the risk manager and backtester.
pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Compute the True Range series. TR[0] is NaN.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            tr[i] = f64::NAN;
        } else {
            tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
        }
    }

    tr
}

/// Simple rolling mean of True Range. NaN for the first `period` bars.
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n <= period {
        return result;
    }

    let tr = true_range(bars);

    // TR starts at index 1, so the first full window ends at index `period`.
    for i in period..n {
        let window = &tr[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

/// Latest ATR value, if the series is long enough to define one.
pub fn latest_atr(bars: &[Bar], period: usize) -> Option<f64> {
    atr(bars, period).last().copied().filter(|v| !v.is_nan())
}
