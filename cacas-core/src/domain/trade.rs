//! SimulatedTrade — one completed round trip produced by the backtest engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

/// Why a simulated position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    Target,
    EndOfData,
}

/// A completed simulated trade: entry → exit, with the stop/target that
/// governed it.
///
/// Gap-throughs fill at the stop price, not the traded low; the engine
/// records the conservative fill it simulated, not the intrabar extreme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedTrade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub stop: f64,
    pub target: f64,
    /// (exit - entry) / entry × 100.
    pub return_pct: f64,
    /// Calendar days between entry and exit, minimum 1.
    pub days_in_trade: i64,
}

impl SimulatedTrade {
    pub fn is_winner(&self) -> bool {
        self.return_pct > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> SimulatedTrade {
        SimulatedTrade {
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            entry_price: 100.0,
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            exit_price: 106.0,
            exit_reason: ExitReason::Target,
            stop: 97.0,
            target: 106.0,
            return_pct: 6.0,
            days_in_trade: 7,
        }
    }

    #[test]
    fn winner_by_return_sign() {
        assert!(sample_trade().is_winner());
        let mut losing = sample_trade();
        losing.return_pct = -3.0;
        assert!(!losing.is_winner());
        losing.return_pct = 0.0;
        assert!(!losing.is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: SimulatedTrade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.entry_date, deser.entry_date);
        assert_eq!(trade.exit_reason, deser.exit_reason);
        assert_eq!(trade.return_pct, deser.return_pct);
    }
}
