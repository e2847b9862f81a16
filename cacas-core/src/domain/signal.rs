//! Categorical per-bar states: signal, crossover, trend.

use serde::{Deserialize, Serialize};

/// Channel signal at one bar: position of the mid line relative to its EMA.
///
/// Encodes to the conventional +1/-1/0 integer signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
}

impl Signal {
    /// Derive the signal from the mid line and its reference EMA.
    ///
    /// Neutral when either operand is undefined (NaN) or the lines are equal.
    pub fn from_lines(mid: f64, reference: f64) -> Self {
        if mid.is_nan() || reference.is_nan() {
            Signal::Neutral
        } else if mid > reference {
            Signal::Bullish
        } else if mid < reference {
            Signal::Bearish
        } else {
            Signal::Neutral
        }
    }

    /// +1 (bullish), -1 (bearish), 0 (neutral).
    pub fn as_int(self) -> i8 {
        match self {
            Signal::Bullish => 1,
            Signal::Bearish => -1,
            Signal::Neutral => 0,
        }
    }
}

/// Signal transition at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    /// Signal flipped bearish → bullish on this bar.
    BullishCross,
    /// Signal flipped bullish → bearish on this bar.
    BearishCross,
    None,
}

impl Crossover {
    /// Transition implied by consecutive signals. The first bar of a series
    /// has no predecessor and therefore no crossover.
    pub fn from_signals(prev: Signal, current: Signal) -> Self {
        match (prev, current) {
            (Signal::Bearish, Signal::Bullish) => Crossover::BullishCross,
            (Signal::Bullish, Signal::Bearish) => Crossover::BearishCross,
            _ => Crossover::None,
        }
    }
}

/// Moving-average trend label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
}

impl Trend {
    /// Uptrend when the short SMA is above the long, downtrend below,
    /// sideways when equal or either is undefined.
    pub fn from_smas(short: f64, long: f64) -> Self {
        if short.is_nan() || long.is_nan() {
            Trend::Sideways
        } else if short > long {
            Trend::Uptrend
        } else if short < long {
            Trend::Downtrend
        } else {
            Trend::Sideways
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_from_lines_trichotomy() {
        assert_eq!(Signal::from_lines(10.0, 9.0), Signal::Bullish);
        assert_eq!(Signal::from_lines(9.0, 10.0), Signal::Bearish);
        assert_eq!(Signal::from_lines(10.0, 10.0), Signal::Neutral);
    }

    #[test]
    fn signal_from_lines_nan_is_neutral() {
        assert_eq!(Signal::from_lines(f64::NAN, 10.0), Signal::Neutral);
        assert_eq!(Signal::from_lines(10.0, f64::NAN), Signal::Neutral);
    }

    #[test]
    fn signal_int_encoding() {
        assert_eq!(Signal::Bullish.as_int(), 1);
        assert_eq!(Signal::Bearish.as_int(), -1);
        assert_eq!(Signal::Neutral.as_int(), 0);
    }

    #[test]
    fn crossover_requires_full_flip() {
        assert_eq!(
            Crossover::from_signals(Signal::Bearish, Signal::Bullish),
            Crossover::BullishCross
        );
        assert_eq!(
            Crossover::from_signals(Signal::Bullish, Signal::Bearish),
            Crossover::BearishCross
        );
        // Neutral on either side is not a cross.
        assert_eq!(
            Crossover::from_signals(Signal::Neutral, Signal::Bullish),
            Crossover::None
        );
        assert_eq!(
            Crossover::from_signals(Signal::Bearish, Signal::Neutral),
            Crossover::None
        );
    }

    #[test]
    fn trend_from_smas() {
        assert_eq!(Trend::from_smas(105.0, 100.0), Trend::Uptrend);
        assert_eq!(Trend::from_smas(95.0, 100.0), Trend::Downtrend);
        assert_eq!(Trend::from_smas(100.0, 100.0), Trend::Sideways);
        assert_eq!(Trend::from_smas(f64::NAN, 100.0), Trend::Sideways);
    }
}
