//! Event-driven replay of the convergence strategy.
//!
//! Two states: flat and in-position. A position opens when the daily and
//! the as-of weekly signal are both bullish; it closes on stop, target, or
//! end of data. One position at a time; signals while in-position are
//! ignored.

use crate::backtest::metrics::BacktestMetrics;
use crate::domain::{Bar, ExitReason, Signal, SimulatedTrade};
use crate::error::{require_positive, ParamError};
use crate::frame::ChannelFrame;
use crate::indicators::{atr, DEFAULT_ATR_PERIOD};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stop distance fallback when ATR is undefined at the entry bar: 2% of close.
const ATR_FALLBACK_FRACTION: f64 = 0.02;

/// Outcome of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub metrics: BacktestMetrics,
    pub trades: Vec<SimulatedTrade>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl BacktestResult {
    fn empty() -> Self {
        Self {
            metrics: BacktestMetrics::default(),
            trades: Vec::new(),
            start_date: None,
            end_date: None,
        }
    }
}

/// Replays the daily series against the weekly signal.
#[derive(Debug, Clone)]
pub struct Backtester {
    atr_period: usize,
    atr_multiplier: f64,
    target_multiplier: f64,
}

impl Default for Backtester {
    fn default() -> Self {
        Self {
            atr_period: DEFAULT_ATR_PERIOD,
            atr_multiplier: 1.5,
            target_multiplier: 2.0,
        }
    }
}

struct OpenPosition {
    entry_date: NaiveDate,
    entry_price: f64,
    stop: f64,
    target: f64,
}

impl Backtester {
    pub fn new(atr_multiplier: f64, target_multiplier: f64) -> Result<Self, ParamError> {
        require_positive("atr_multiplier", atr_multiplier)?;
        require_positive("target_multiplier", target_multiplier)?;
        Ok(Self {
            atr_period: DEFAULT_ATR_PERIOD,
            atr_multiplier,
            target_multiplier,
        })
    }

    /// Run the full replay. Empty or signal-less input degrades to an empty
    /// result, never an error.
    pub fn run(&self, daily: &ChannelFrame, weekly: &ChannelFrame) -> BacktestResult {
        let bars = daily.bars();
        if bars.is_empty() {
            return BacktestResult::empty();
        }

        let weekly_at = weekly_signals_asof(bars, weekly);
        let atr_series = atr(bars, self.atr_period);

        let mut trades: Vec<SimulatedTrade> = Vec::new();
        let mut open: Option<OpenPosition> = None;

        for (i, bar) in bars.iter().enumerate() {
            match &open {
                None => {
                    if daily.signal[i] == Signal::Bullish && weekly_at[i] == Signal::Bullish {
                        let atr_value = if atr_series[i].is_nan() {
                            bar.close * ATR_FALLBACK_FRACTION
                        } else {
                            atr_series[i]
                        };
                        let stop_distance = atr_value * self.atr_multiplier;
                        open = Some(OpenPosition {
                            entry_date: bar.date,
                            entry_price: bar.close,
                            stop: bar.close - stop_distance,
                            target: bar.close + stop_distance * self.target_multiplier,
                        });
                    }
                }
                Some(pos) => {
                    // Stop has priority when both levels trade within one
                    // bar: OHLC cannot order intrabar fills, so the engine
                    // assumes the adverse path.
                    if bar.low <= pos.stop {
                        trades.push(close_position(pos, bar.date, pos.stop, ExitReason::StopLoss));
                        open = None;
                    } else if bar.high >= pos.target {
                        trades.push(close_position(pos, bar.date, pos.target, ExitReason::Target));
                        open = None;
                    }
                }
            }
        }

        // Still holding after the last bar: force-close at the last close.
        if let Some(pos) = &open {
            let last = &bars[bars.len() - 1];
            trades.push(close_position(pos, last.date, last.close, ExitReason::EndOfData));
        }

        BacktestResult {
            metrics: BacktestMetrics::from_trades(&trades),
            start_date: Some(bars[0].date),
            end_date: Some(bars[bars.len() - 1].date),
            trades,
        }
    }
}

fn close_position(
    pos: &OpenPosition,
    exit_date: NaiveDate,
    exit_price: f64,
    exit_reason: ExitReason,
) -> SimulatedTrade {
    let return_pct = if pos.entry_price > 0.0 {
        (exit_price - pos.entry_price) / pos.entry_price * 100.0
    } else {
        0.0
    };
    let days_in_trade = (exit_date - pos.entry_date).num_days().max(1);

    SimulatedTrade {
        entry_date: pos.entry_date,
        entry_price: pos.entry_price,
        exit_date,
        exit_price,
        exit_reason,
        stop: pos.stop,
        target: pos.target,
        return_pct,
        days_in_trade,
    }
}

/// The weekly signal valid at each daily bar: the signal of the latest
/// weekly bar dated on or before the daily bar (as-of join). Neutral before
/// the first weekly bar.
pub fn weekly_signals_asof(daily: &[Bar], weekly: &ChannelFrame) -> Vec<Signal> {
    let wbars = weekly.bars();
    let mut result = vec![Signal::Neutral; daily.len()];

    let mut j = 0usize;
    for (i, bar) in daily.iter().enumerate() {
        while j < wbars.len() && wbars[j].date <= bar.date {
            j += 1;
        }
        if j > 0 {
            result[i] = weekly.signal[j - 1];
        }
    }

    result
}
