//! Cacas Channel — dual rolling-extrema bands with an EMA reference line.
//!
//! Four lines per bar:
//! - upper: rolling max of close over `upper` bars
//! - lower: rolling min of close over `under` bars
//! - mid: (upper + lower) / 2
//! - reference: recursive EMA of mid, span `ema`, seeded with the first
//!   defined mid value
//!
//! The per-bar signal is the position of mid relative to reference; the
//! crossover column marks full bearish↔bullish flips.

use crate::domain::{Bar, Crossover, Signal};
use crate::error::{require_window, ParamError};
use crate::frame::ChannelFrame;
use serde::{Deserialize, Serialize};

/// Channel window lengths. Defaults match the indicator's canonical
/// 20/30/9 configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelParams {
    /// Lookback for the upper band (rolling max of close).
    pub upper: usize,
    /// Lookback for the lower band (rolling min of close).
    pub under: usize,
    /// EMA span for the reference line.
    pub ema: usize,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            upper: 20,
            under: 30,
            ema: 9,
        }
    }
}

impl ChannelParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        require_window("upper", self.upper)?;
        require_window("under", self.under)?;
        require_window("ema", self.ema)?;
        Ok(())
    }
}

/// The channel indicator. Construction validates the window lengths; a
/// constructed instance always produces well-formed frames.
#[derive(Debug, Clone)]
pub struct CacasChannel {
    params: ChannelParams,
}

impl CacasChannel {
    pub fn new(params: ChannelParams) -> Result<Self, ParamError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> ChannelParams {
        self.params
    }

    /// Compute the channel plus ATR and the optional annotators in one call.
    pub fn compute_full(
        &self,
        bars: Vec<Bar>,
        include_volatility: bool,
        include_trend: bool,
    ) -> ChannelFrame {
        use crate::indicators::{
            annotate_trend, annotate_volatility, atr, TrendWindows, VolatilityWindows,
            DEFAULT_ATR_PERIOD,
        };

        let mut frame = self.compute(bars);
        frame.atr = Some(atr(frame.bars(), DEFAULT_ATR_PERIOD));
        if include_volatility {
            annotate_volatility(&mut frame, VolatilityWindows::default());
        }
        if include_trend {
            annotate_trend(&mut frame, TrendWindows::default());
        }
        frame
    }

    /// Compute the channel over a bar series.
    ///
    /// Accepts any non-negative number of bars; columns stay NaN/Neutral
    /// until each window has enough history. Output depends only on the
    /// input series and the params.
    pub fn compute(&self, bars: Vec<Bar>) -> ChannelFrame {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let n = closes.len();

        let upper = rolling_max(&closes, self.params.upper);
        let lower = rolling_min(&closes, self.params.under);

        let mut mid = vec![f64::NAN; n];
        for i in 0..n {
            if !upper[i].is_nan() && !lower[i].is_nan() {
                mid[i] = (upper[i] + lower[i]) / 2.0;
            }
        }

        let reference = ema_of_mid(&mid, self.params.ema);

        let signal: Vec<Signal> = (0..n)
            .map(|i| Signal::from_lines(mid[i], reference[i]))
            .collect();
        let crossover = detect_crossovers(&signal);

        ChannelFrame::new(bars, upper, lower, mid, reference, signal, crossover)
    }
}

/// Rolling maximum over a trailing window. NaN until the window is full;
/// NaN inputs inside the window poison the output bar.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, true)
}

/// Rolling minimum over a trailing window.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, false)
}

fn rolling_extreme(values: &[f64], period: usize, take_max: bool) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        let mut best = if take_max {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut has_nan = false;
        for &v in window {
            if v.is_nan() {
                has_nan = true;
                break;
            }
            if (take_max && v > best) || (!take_max && v < best) {
                best = v;
            }
        }
        result[i] = if has_nan { f64::NAN } else { best };
    }

    result
}

/// Recursive EMA of the mid line, alpha = 2/(span+1).
///
/// Seed: the first defined mid value (the recursion starts there, so the
/// seed bar's reference equals its mid). NaN after the seed taints the rest.
fn ema_of_mid(mid: &[f64], span: usize) -> Vec<f64> {
    let n = mid.len();
    let mut result = vec![f64::NAN; n];

    let first_defined = match mid.iter().position(|v| !v.is_nan()) {
        Some(i) => i,
        None => return result,
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = mid[first_defined];
    result[first_defined] = prev;

    for i in (first_defined + 1)..n {
        if mid[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let ema = prev + alpha * (mid[i] - prev);
        result[i] = ema;
        prev = ema;
    }

    result
}

/// Mark bearish↔bullish signal flips. The first bar never crosses.
pub fn detect_crossovers(signal: &[Signal]) -> Vec<Crossover> {
    let mut result = vec![Crossover::None; signal.len()];
    for i in 1..signal.len() {
        result[i] = Crossover::from_signals(signal[i - 1], signal[i]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn channel(upper: usize, under: usize, ema: usize) -> CacasChannel {
        CacasChannel::new(ChannelParams { upper, under, ema }).unwrap()
    }

    #[test]
    fn params_default_is_valid() {
        assert!(ChannelParams::default().validate().is_ok());
    }

    #[test]
    fn zero_window_rejected_at_construction() {
        let params = ChannelParams {
            upper: 0,
            under: 30,
            ema: 9,
        };
        assert!(CacasChannel::new(params).is_err());
    }

    #[test]
    fn rolling_max_window_3() {
        let values = [1.0, 3.0, 2.0, 5.0, 4.0];
        let result = rolling_max(&values, 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 3.0, DEFAULT_EPSILON);
        assert_approx(result[3], 5.0, DEFAULT_EPSILON);
        assert_approx(result[4], 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_min_window_2() {
        let values = [4.0, 3.0, 5.0, 1.0];
        let result = rolling_min(&values, 2);
        assert!(result[0].is_nan());
        assert_approx(result[1], 3.0, DEFAULT_EPSILON);
        assert_approx(result[2], 3.0, DEFAULT_EPSILON);
        assert_approx(result[3], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn mid_is_exact_band_average() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 14.0, 13.0, 15.0]);
        let frame = channel(3, 3, 3).compute(bars);
        for i in 0..frame.len() {
            if !frame.mid[i].is_nan() {
                assert_approx(
                    frame.mid[i],
                    (frame.upper[i] + frame.lower[i]) / 2.0,
                    DEFAULT_EPSILON,
                );
            }
        }
    }

    #[test]
    fn mid_undefined_until_both_bands_defined() {
        // upper needs 2 bars, under needs 4: mid starts at index 3.
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let frame = channel(2, 4, 3).compute(bars);
        assert!(frame.mid[0].is_nan());
        assert!(!frame.upper[1].is_nan());
        assert!(frame.mid[1].is_nan());
        assert!(frame.mid[2].is_nan());
        assert!(!frame.mid[3].is_nan());
    }

    #[test]
    fn reference_seeded_with_first_mid() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let frame = channel(3, 3, 3).compute(bars);
        // First defined mid is at index 2; the seed makes reference == mid there.
        assert_approx(frame.reference[2], frame.mid[2], DEFAULT_EPSILON);
        // alpha = 0.5: ref[3] = ref[2] + 0.5*(mid[3]-ref[2])
        let expected = frame.reference[2] + 0.5 * (frame.mid[3] - frame.reference[2]);
        assert_approx(frame.reference[3], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn seed_bar_is_neutral_then_rising_turns_bullish() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let frame = channel(3, 3, 3).compute(bars);
        // mid == reference at the seed bar.
        assert_eq!(frame.signal[2], Signal::Neutral);
        // Rising closes: mid pulls ahead of its lagging EMA.
        assert_eq!(frame.signal[3], Signal::Bullish);
        assert_eq!(*frame.signal.last().unwrap(), Signal::Bullish);
    }

    #[test]
    fn falling_series_turns_bearish() {
        let bars = make_bars(&[20.0, 19.0, 18.0, 17.0, 16.0, 15.0, 14.0]);
        let frame = channel(3, 3, 3).compute(bars);
        assert_eq!(*frame.signal.last().unwrap(), Signal::Bearish);
    }

    #[test]
    fn crossover_marked_on_flip_bar() {
        // Fall long enough to go bearish, then rally hard.
        let closes = [20.0, 19.0, 18.0, 17.0, 16.0, 15.0, 22.0, 26.0, 30.0];
        let bars = make_bars(&closes);
        let frame = channel(3, 3, 3).compute(bars);

        let flips: Vec<usize> = (0..frame.len())
            .filter(|&i| frame.crossover[i] == Crossover::BullishCross)
            .collect();
        assert_eq!(flips.len(), 1);
        let k = flips[0];
        assert_eq!(frame.signal[k], Signal::Bullish);
        assert_eq!(frame.signal[k - 1], Signal::Bearish);
    }

    #[test]
    fn no_crossover_at_first_bar() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let frame = channel(1, 1, 1).compute(bars);
        assert_eq!(frame.crossover[0], Crossover::None);
    }

    #[test]
    fn empty_and_short_series_produce_nan_columns() {
        let frame = channel(20, 30, 9).compute(Vec::new());
        assert!(frame.is_empty());

        let bars = make_bars(&[10.0, 11.0]);
        let frame = channel(20, 30, 9).compute(bars);
        assert_eq!(frame.len(), 2);
        assert!(frame.upper.iter().all(|v| v.is_nan()));
        assert!(frame.signal.iter().all(|&s| s == Signal::Neutral));
    }

    #[test]
    fn compute_full_attaches_atr_and_annotators() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).cos() * 4.0).collect();
        let frame = channel(3, 3, 3).compute_full(make_bars(&closes), true, true);
        let atr = frame.atr.as_ref().unwrap();
        assert_eq!(atr.len(), frame.len());
        assert!(atr[13].is_nan());
        assert!(!atr[14].is_nan());
        assert!(frame.volatility.is_some());
        assert!(frame.trend.is_some());

        let bare = channel(3, 3, 3).compute_full(make_bars(&closes), false, false);
        assert!(bare.atr.is_some());
        assert!(bare.volatility.is_none());
        assert!(bare.trend.is_none());
    }

    #[test]
    fn compute_is_deterministic() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let ch = channel(20, 30, 9);
        let a = ch.compute(make_bars(&closes));
        let b = ch.compute(make_bars(&closes));
        for i in 0..a.len() {
            assert!(
                a.reference[i].to_bits() == b.reference[i].to_bits(),
                "reference diverged at {i}"
            );
        }
    }
}
