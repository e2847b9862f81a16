//! Data seam: provider trait, validation, weekly resampling.

pub mod provider;
pub mod resample;

pub use provider::{validate_series, DataError, MarketData, Period, MIN_BARS};
pub use resample::{resample_weekly, week_ending_friday};
