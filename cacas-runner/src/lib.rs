//! Cacas Runner — batch orchestration over many instruments.
//!
//! Wraps the core's per-instrument primitives (classification, backtest)
//! into parallel multi-asset operations with skip-and-continue error
//! containment, plus the serializable run configuration that keys them.

pub mod batch;
pub mod config;
pub mod progress;
pub mod scan;

pub use batch::{batch_backtest, BatchOutcome, TickerSummary};
pub use config::{ConfigError, ScanConfig};
pub use progress::{ScanProgress, SilentProgress, StdoutProgress};
pub use scan::{
    buy_signals, filter_by_status, scan_assets, sell_signals, sort_by_priority, waiting_signals,
    write_csv, AssetFrames, ScanCsvRow, ScanHit, ScanOutcome,
};
