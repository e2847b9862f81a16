//! Risk management: ATR stops, risk-multiple targets, position sizing.
//!
//! All computations snapshot the latest bar of a series. Thin data (not
//! enough bars to define an ATR) yields `None`, never an error; degenerate
//! risk (zero distance) yields zero-sized positions, never a division by
//! zero.

use crate::domain::{Bar, Direction};
use crate::error::{require_positive, require_window, ParamError};
use crate::indicators::{latest_atr, DEFAULT_ATR_PERIOD};
use serde::{Deserialize, Serialize};

/// The standard target ladder offered alongside a plan's chosen target.
pub const DEFAULT_TARGET_MULTIPLIERS: [f64; 4] = [1.5, 2.0, 2.5, 3.0];

/// Stop-loss derivation for an entry at the latest bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopInfo {
    pub direction: Direction,
    pub entry_price: f64,
    pub atr: f64,
    pub stop_distance: f64,
    pub stop_price: f64,
    /// Risk per share, stored as a positive magnitude for both directions
    /// so target arithmetic never inverts.
    pub risk: f64,
    pub risk_pct: f64,
}

/// One target on the risk-multiple ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetLevel {
    pub multiplier: f64,
    pub price: f64,
    pub gain: f64,
    pub gain_pct: f64,
}

impl TargetLevel {
    fn new(entry: f64, risk: f64, multiplier: f64) -> Self {
        let price = entry + risk * multiplier;
        let gain = price - entry;
        let gain_pct = if entry > 0.0 { gain / entry * 100.0 } else { 0.0 };
        Self {
            multiplier,
            price,
            gain,
            gain_pct,
        }
    }
}

/// Share count sized off a capital-percent risk budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSize {
    pub capital: f64,
    pub risk_percent: f64,
    pub risk_amount: f64,
    pub shares: u64,
    pub position_value: f64,
    pub position_pct: f64,
}

/// A complete trade plan snapshot: entry, stop, chosen target, the full
/// target ladder, and optional sizing. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradePlan {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop: StopInfo,
    pub target: TargetLevel,
    pub all_targets: Vec<TargetLevel>,
    pub atr: f64,
    /// Declared risk-reward ratio — the chosen target multiplier.
    pub risk_reward: f64,
    pub position: Option<PositionSize>,
}

/// Derives stops and targets from ATR.
#[derive(Debug, Clone)]
pub struct RiskManager {
    atr_period: usize,
    atr_multiplier: f64,
}

impl Default for RiskManager {
    fn default() -> Self {
        Self {
            atr_period: DEFAULT_ATR_PERIOD,
            atr_multiplier: 1.5,
        }
    }
}

impl RiskManager {
    pub fn new(atr_period: usize, atr_multiplier: f64) -> Result<Self, ParamError> {
        require_window("atr_period", atr_period)?;
        require_positive("atr_multiplier", atr_multiplier)?;
        Ok(Self {
            atr_period,
            atr_multiplier,
        })
    }

    /// Stop-loss for an entry at the latest bar.
    ///
    /// None when the series is too short to define an ATR (needs
    /// `atr_period + 1` bars).
    pub fn stop_loss(&self, bars: &[Bar], direction: Direction) -> Option<StopInfo> {
        let last = bars.last()?;
        let atr_value = latest_atr(bars, self.atr_period)?;

        let stop_distance = atr_value * self.atr_multiplier;
        let (stop_price, signed_risk) = match direction {
            // Long: stop below the latest low.
            Direction::Long => {
                let stop = last.low - stop_distance;
                (stop, last.close - stop)
            }
            // Short: stop above the latest high.
            Direction::Short => {
                let stop = last.high + stop_distance;
                (stop, stop - last.close)
            }
        };

        let risk = signed_risk.abs();
        let risk_pct = if last.close > 0.0 {
            risk / last.close * 100.0
        } else {
            0.0
        };

        Some(StopInfo {
            direction,
            entry_price: last.close,
            atr: atr_value,
            stop_distance,
            stop_price,
            risk,
            risk_pct,
        })
    }

    /// Target ladder: `price = entry + risk × multiplier` for each multiplier.
    pub fn targets(stop: &StopInfo, multipliers: &[f64]) -> Vec<TargetLevel> {
        multipliers
            .iter()
            .map(|&m| TargetLevel::new(stop.entry_price, stop.risk, m))
            .collect()
    }

    /// Size a position so that a stop-out loses `risk_percent` of capital.
    ///
    /// Degenerate inputs (non-positive capital or risk) size to zero shares.
    pub fn position_size(capital: f64, risk_percent: f64, stop: &StopInfo) -> PositionSize {
        let risk_amount = capital * risk_percent / 100.0;
        let shares = if capital <= 0.0 || risk_amount <= 0.0 || stop.risk <= 0.0 {
            0
        } else {
            (risk_amount / stop.risk).floor() as u64
        };
        let position_value = shares as f64 * stop.entry_price;
        let position_pct = if capital > 0.0 {
            position_value / capital * 100.0
        } else {
            0.0
        };
        PositionSize {
            capital,
            risk_percent,
            risk_amount,
            shares,
            position_value,
            position_pct,
        }
    }

    /// Build a full plan off the latest bar. None when no stop can be
    /// derived. `capital`, when given, adds sizing at `risk_percent` of it.
    pub fn trade_plan(
        &self,
        bars: &[Bar],
        direction: Direction,
        target_multiplier: f64,
        capital: Option<f64>,
        risk_percent: f64,
    ) -> Option<TradePlan> {
        let stop = self.stop_loss(bars, direction)?;
        let target = TargetLevel::new(stop.entry_price, stop.risk, target_multiplier);
        let all_targets = Self::targets(&stop, &DEFAULT_TARGET_MULTIPLIERS);
        let position = capital.map(|c| Self::position_size(c, risk_percent, &stop));

        Some(TradePlan {
            direction,
            entry_price: stop.entry_price,
            atr: stop.atr,
            risk_reward: target_multiplier,
            stop,
            target,
            all_targets,
            position,
        })
    }
}
