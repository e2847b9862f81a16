//! ChannelFrame — a bar series annotated with the channel columns.
//!
//! Columns are parallel vectors the same length as the bar series, NaN (or
//! Neutral) during warmup. Signal and crossover are derived from mid and
//! reference and are never set independently; recomputing over the same
//! bars reproduces the frame bit-for-bit.

use crate::domain::{Bar, Crossover, Signal, Trend};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Annualized historical volatility columns (percent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityColumns {
    pub monthly: Vec<f64>,
    pub quarterly: Vec<f64>,
    pub yearly: Vec<f64>,
}

/// Moving-average trend columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendColumns {
    pub sma_short: Vec<f64>,
    pub sma_long: Vec<f64>,
    pub label: Vec<Trend>,
}

/// A price series with the computed channel lines and derived states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelFrame {
    bars: Vec<Bar>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub mid: Vec<f64>,
    pub reference: Vec<f64>,
    pub signal: Vec<Signal>,
    pub crossover: Vec<Crossover>,
    /// Filled by `compute_full`; absent when only the channel was computed.
    pub atr: Option<Vec<f64>>,
    pub volatility: Option<VolatilityColumns>,
    pub trend: Option<TrendColumns>,
}

/// The latest bar of a frame with its computed values, for display and
/// convergence classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub upper: f64,
    pub lower: f64,
    pub mid: f64,
    pub reference: f64,
    pub signal: Signal,
    pub crossover: Crossover,
    pub vol_monthly: Option<f64>,
    pub vol_quarterly: Option<f64>,
    pub vol_yearly: Option<f64>,
    pub trend: Option<Trend>,
}

impl ChannelFrame {
    pub(crate) fn new(
        bars: Vec<Bar>,
        upper: Vec<f64>,
        lower: Vec<f64>,
        mid: Vec<f64>,
        reference: Vec<f64>,
        signal: Vec<Signal>,
        crossover: Vec<Crossover>,
    ) -> Self {
        debug_assert_eq!(bars.len(), upper.len());
        debug_assert_eq!(bars.len(), signal.len());
        Self {
            bars,
            upper,
            lower,
            mid,
            reference,
            signal,
            crossover,
            atr: None,
            volatility: None,
            trend: None,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Signal at the most recent bar. None only when the frame is empty.
    pub fn latest_signal(&self) -> Option<Signal> {
        self.signal.last().copied()
    }

    /// Crossover at the most recent bar. None only when the frame is empty.
    pub fn latest_crossover(&self) -> Option<Crossover> {
        self.crossover.last().copied()
    }

    /// Snapshot of the most recent bar with all computed values.
    pub fn latest(&self) -> Option<FrameSnapshot> {
        let i = self.bars.len().checked_sub(1)?;
        let bar = &self.bars[i];
        let non_nan = |v: f64| if v.is_nan() { None } else { Some(v) };
        Some(FrameSnapshot {
            date: bar.date,
            close: bar.close,
            upper: self.upper[i],
            lower: self.lower[i],
            mid: self.mid[i],
            reference: self.reference[i],
            signal: self.signal[i],
            crossover: self.crossover[i],
            vol_monthly: self.volatility.as_ref().and_then(|v| non_nan(v.monthly[i])),
            vol_quarterly: self.volatility.as_ref().and_then(|v| non_nan(v.quarterly[i])),
            vol_yearly: self.volatility.as_ref().and_then(|v| non_nan(v.yearly[i])),
            trend: self.trend.as_ref().map(|t| t.label[i]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::channel::{CacasChannel, ChannelParams};
    use crate::indicators::make_bars;

    #[test]
    fn empty_frame_has_no_latest() {
        let ch = CacasChannel::new(ChannelParams::default()).unwrap();
        let frame = ch.compute(Vec::new());
        assert!(frame.latest_signal().is_none());
        assert!(frame.latest_crossover().is_none());
        assert!(frame.latest().is_none());
    }

    #[test]
    fn snapshot_reflects_last_bar() {
        let ch = CacasChannel::new(ChannelParams {
            upper: 3,
            under: 3,
            ema: 3,
        })
        .unwrap();
        let frame = ch.compute(make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]));
        let snap = frame.latest().unwrap();
        assert_eq!(snap.close, 14.0);
        assert_eq!(snap.signal, frame.latest_signal().unwrap());
        assert!(snap.vol_monthly.is_none());
        assert!(snap.trend.is_none());
    }
}
