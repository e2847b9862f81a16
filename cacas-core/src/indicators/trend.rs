//! Moving-average trend annotator.
//!
//! Short and long SMAs of close; the per-bar label compares them
//! (short above long = uptrend).

use crate::domain::Trend;
use crate::frame::{ChannelFrame, TrendColumns};
use crate::indicators::sma::sma_of_series;
use serde::{Deserialize, Serialize};

/// SMA window pair for trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendWindows {
    pub short: usize,
    pub long: usize,
}

impl Default for TrendWindows {
    fn default() -> Self {
        Self {
            short: 50,
            long: 200,
        }
    }
}

/// Attach SMA trend columns to a frame.
pub fn annotate_trend(frame: &mut ChannelFrame, windows: TrendWindows) {
    let closes: Vec<f64> = frame.bars().iter().map(|b| b.close).collect();
    let sma_short = sma_of_series(&closes, windows.short);
    let sma_long = sma_of_series(&closes, windows.long);

    let label: Vec<Trend> = sma_short
        .iter()
        .zip(&sma_long)
        .map(|(&s, &l)| Trend::from_smas(s, l))
        .collect();

    frame.trend = Some(TrendColumns {
        sma_short,
        sma_long,
        label,
    });
}
