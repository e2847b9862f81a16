//! Performance metrics — pure functions over the simulated trade list.

use crate::domain::{ExitReason, SimulatedTrade};
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregate statistics for one backtest run.
///
/// An empty trade list yields the all-zero default — the degenerate case of
/// a strategy that never entered, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent of trades with a positive return.
    pub win_rate: f64,
    /// Win rate over stop/target exits only; EndOfData closes are excluded
    /// so an arbitrarily-timed series cutoff does not bias the rate.
    pub adjusted_win_rate: f64,
    pub total_return: f64,
    pub avg_return: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    /// Gross profit over gross loss; +inf when there are profits and no
    /// losses.
    pub profit_factor: f64,
    /// Most negative excursion of the compounded cumulative-return curve,
    /// in percent (≤ 0).
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub avg_days_in_trade: f64,
    pub expectancy: f64,
    pub targets_hit: usize,
    pub stops_hit: usize,
}

impl BacktestMetrics {
    pub fn from_trades(trades: &[SimulatedTrade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let returns: Vec<f64> = trades.iter().map(|t| t.return_pct).collect();
        let wins: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
        let losses: Vec<f64> = returns.iter().copied().filter(|r| *r <= 0.0).collect();

        let total_trades = trades.len();
        let winning_trades = wins.len();
        let losing_trades = losses.len();
        let win_rate = winning_trades as f64 / total_trades as f64 * 100.0;

        let stops_hit = trades
            .iter()
            .filter(|t| t.exit_reason == ExitReason::StopLoss)
            .count();
        let targets_hit = trades
            .iter()
            .filter(|t| t.exit_reason == ExitReason::Target)
            .count();
        let completed = stops_hit + targets_hit;
        let adjusted_win_rate = if completed > 0 {
            targets_hit as f64 / completed as f64 * 100.0
        } else {
            0.0
        };

        let avg_win = mean(&wins);
        let avg_loss = mean(&losses);
        let avg_return = mean(&returns);
        let avg_days_in_trade = mean(
            &trades
                .iter()
                .map(|t| t.days_in_trade as f64)
                .collect::<Vec<_>>(),
        );

        let gross_profit: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum::<f64>().abs();
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            f64::INFINITY
        };

        let loss_rate = 100.0 - win_rate;
        let expectancy = win_rate / 100.0 * avg_win + loss_rate / 100.0 * avg_loss;

        Self {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            adjusted_win_rate,
            total_return: returns.iter().sum(),
            avg_return,
            avg_win,
            avg_loss,
            profit_factor,
            max_drawdown: max_drawdown(&returns),
            sharpe_ratio: sharpe_like(&returns, avg_days_in_trade),
            best_trade: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_trade: returns.iter().copied().fold(f64::INFINITY, f64::min),
            avg_days_in_trade,
            expectancy,
            targets_hit,
            stops_hit,
        }
    }
}

/// Maximum drawdown, in percent, of the equity curve built by compounding
/// each trade's return in sequence. 0.0 for a curve that never dips.
pub fn max_drawdown(returns_pct: &[f64]) -> f64 {
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;

    for r in returns_pct {
        equity *= 1.0 + r / 100.0;
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (equity - peak) / peak * 100.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Per-trade Sharpe-like ratio: mean/std of trade returns, scaled by
/// √(252 / average holding days). Zero when the dispersion is zero or
/// undefined.
pub fn sharpe_like(returns_pct: &[f64], avg_days_in_trade: f64) -> f64 {
    if returns_pct.len() < 2 || avg_days_in_trade <= 0.0 {
        return 0.0;
    }
    let std = std_dev(returns_pct);
    if std < 1e-15 {
        return 0.0;
    }
    mean(returns_pct) / std * (TRADING_DAYS_PER_YEAR / avg_days_in_trade).sqrt()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_trade(return_pct: f64, exit_reason: ExitReason, days: i64) -> SimulatedTrade {
        let entry = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        SimulatedTrade {
            entry_date: entry,
            entry_price: 100.0,
            exit_date: entry + chrono::Duration::days(days),
            exit_price: 100.0 * (1.0 + return_pct / 100.0),
            exit_reason,
            stop: 97.0,
            target: 106.0,
            return_pct,
            days_in_trade: days,
        }
    }

    #[test]
    fn empty_trades_all_zero() {
        let m = BacktestMetrics::from_trades(&[]);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
    }

    #[test]
    fn win_rate_counts_positive_returns_only() {
        let trades = vec![
            make_trade(6.0, ExitReason::Target, 5),
            make_trade(-3.0, ExitReason::StopLoss, 3),
            make_trade(0.0, ExitReason::EndOfData, 2),
            make_trade(2.0, ExitReason::Target, 4),
        ];
        let m = BacktestMetrics::from_trades(&trades);
        assert_eq!(m.total_trades, 4);
        assert_eq!(m.winning_trades, 2);
        assert_eq!(m.losing_trades, 2);
        assert!((m.win_rate - 50.0).abs() < 1e-10);
    }

    #[test]
    fn adjusted_win_rate_excludes_end_of_data() {
        let trades = vec![
            make_trade(6.0, ExitReason::Target, 5),
            make_trade(-3.0, ExitReason::StopLoss, 3),
            make_trade(-1.0, ExitReason::EndOfData, 2),
        ];
        let m = BacktestMetrics::from_trades(&trades);
        // 1 target of 2 completed exits.
        assert!((m.adjusted_win_rate - 50.0).abs() < 1e-10);
        assert_eq!(m.targets_hit, 1);
        assert_eq!(m.stops_hit, 1);
    }

    #[test]
    fn adjusted_win_rate_zero_when_only_end_of_data() {
        let trades = vec![make_trade(4.0, ExitReason::EndOfData, 5)];
        let m = BacktestMetrics::from_trades(&trades);
        assert_eq!(m.adjusted_win_rate, 0.0);
        assert!((m.win_rate - 100.0).abs() < 1e-10);
    }

    #[test]
    fn profit_factor_known_values() {
        let trades = vec![
            make_trade(5.0, ExitReason::Target, 5),
            make_trade(3.0, ExitReason::Target, 5),
            make_trade(-2.0, ExitReason::StopLoss, 3),
        ];
        let m = BacktestMetrics::from_trades(&trades);
        assert!((m.profit_factor - 4.0).abs() < 1e-10);
    }

    #[test]
    fn profit_factor_infinite_without_losses() {
        let trades = vec![make_trade(5.0, ExitReason::Target, 5)];
        let m = BacktestMetrics::from_trades(&trades);
        assert!(m.profit_factor.is_infinite());
    }

    #[test]
    fn max_drawdown_known_sequence() {
        // +10% then -20%: peak 1.1, trough 0.88 → dd = -20%.
        let dd = max_drawdown(&[10.0, -20.0]);
        assert!((dd - (-20.0)).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_monotonic_gains_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn sharpe_zero_for_constant_returns() {
        assert_eq!(sharpe_like(&[2.0, 2.0, 2.0], 5.0), 0.0);
        assert_eq!(sharpe_like(&[2.0], 5.0), 0.0);
    }

    #[test]
    fn sharpe_positive_for_mostly_positive_returns() {
        let s = sharpe_like(&[2.0, 3.0, 1.5, 2.5], 5.0);
        assert!(s > 0.0);
        assert!(s.is_finite());
    }

    #[test]
    fn expectancy_combines_win_and_loss_legs() {
        let trades = vec![
            make_trade(6.0, ExitReason::Target, 5),
            make_trade(-2.0, ExitReason::StopLoss, 3),
        ];
        let m = BacktestMetrics::from_trades(&trades);
        // 50%*6 + 50%*(-2) = 2.
        assert!((m.expectancy - 2.0).abs() < 1e-10);
    }

    #[test]
    fn best_and_worst_trade() {
        let trades = vec![
            make_trade(6.0, ExitReason::Target, 5),
            make_trade(-3.0, ExitReason::StopLoss, 3),
            make_trade(1.0, ExitReason::EndOfData, 1),
        ];
        let m = BacktestMetrics::from_trades(&trades);
        assert_eq!(m.best_trade, 6.0);
        assert_eq!(m.worst_trade, -3.0);
    }
}
