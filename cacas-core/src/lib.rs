//! Cacas Core — the signal-and-risk engine behind the convergence scanner.
//!
//! This crate contains:
//! - Domain types (bars, signals, simulated trades)
//! - The Cacas Channel indicator (dual bands, mid line, EMA reference) and
//!   its volatility/trend annotators
//! - Multi-timeframe convergence classification
//! - ATR-based risk management (stops, target ladders, position sizing)
//! - The bar-by-bar backtest engine and its performance metrics
//! - The data seam: provider trait, validation, weekly resampling
//!
//! Everything is a pure function over explicit inputs: no I/O, no global
//! state, no shared mutation. Per-instrument work is independent, so batch
//! callers can fan out freely.

pub mod backtest;
pub mod data;
pub mod domain;
pub mod error;
pub mod frame;
pub mod indicators;
pub mod risk;
pub mod signals;
pub mod synthetic;

pub use backtest::{BacktestMetrics, BacktestResult, Backtester};
pub use data::{resample_weekly, validate_series, MarketData, Period, MIN_BARS};
pub use domain::{Bar, Crossover, Direction, ExitReason, Signal, SimulatedTrade, Trend};
pub use error::ParamError;
pub use frame::{ChannelFrame, FrameSnapshot};
pub use indicators::{CacasChannel, ChannelParams};
pub use risk::{RiskManager, StopInfo, TradePlan};
pub use signals::{classify, ConvergenceRecord, ConvergenceStatus, ConvergenceType};
