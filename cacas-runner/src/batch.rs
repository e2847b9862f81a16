//! Parallel batch backtesting over a universe of instruments.

use crate::scan::AssetFrames;
use cacas_core::backtest::{BacktestMetrics, Backtester};
use cacas_core::ParamError;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline metrics for one ticker, with the stable export column names.
#[derive(Debug, Clone, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub total_trades: usize,
    pub win_rate: f64,
    #[serde(rename = "win_rate_ajustado")]
    pub adjusted_win_rate: f64,
    #[serde(rename = "retorno_total")]
    pub total_return: f64,
    #[serde(rename = "retorno_medio")]
    pub avg_return: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    #[serde(rename = "expectancia")]
    pub expectancy: f64,
    #[serde(rename = "alvos_atingidos")]
    pub targets_hit: usize,
    #[serde(rename = "stops_atingidos")]
    pub stops_hit: usize,
}

impl TickerSummary {
    fn new(ticker: &str, metrics: &BacktestMetrics) -> Self {
        Self {
            ticker: ticker.to_string(),
            total_trades: metrics.total_trades,
            win_rate: metrics.win_rate,
            adjusted_win_rate: metrics.adjusted_win_rate,
            total_return: metrics.total_return,
            avg_return: metrics.avg_return,
            profit_factor: metrics.profit_factor,
            max_drawdown: metrics.max_drawdown,
            sharpe_ratio: metrics.sharpe_ratio,
            expectancy: metrics.expectancy,
            targets_hit: metrics.targets_hit,
            stops_hit: metrics.stops_hit,
        }
    }
}

/// Result of a batch backtest: per-ticker summaries in ticker order plus
/// the tickers skipped for missing data.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub summaries: Vec<TickerSummary>,
    pub skipped: Vec<String>,
}

/// Backtest every instrument with both frames, in parallel.
///
/// The multipliers are validated once, up front; missing-data tickers are
/// skipped and reported.
pub fn batch_backtest(
    assets: &BTreeMap<String, AssetFrames>,
    atr_multiplier: f64,
    target_multiplier: f64,
) -> Result<BatchOutcome, ParamError> {
    let backtester = Backtester::new(atr_multiplier, target_multiplier)?;
    let entries: Vec<(&String, &AssetFrames)> = assets.iter().collect();

    let results: Vec<(String, Option<TickerSummary>)> = entries
        .into_par_iter()
        .map(|(ticker, frames)| {
            let summary = match (&frames.daily, &frames.weekly) {
                (Some(daily), Some(weekly)) => {
                    let result = backtester.run(daily, weekly);
                    Some(TickerSummary::new(ticker, &result.metrics))
                }
                _ => None,
            };
            (ticker.clone(), summary)
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for (ticker, summary) in results {
        match summary {
            Some(summary) => outcome.summaries.push(summary),
            None => outcome.skipped.push(ticker),
        }
    }
    Ok(outcome)
}
