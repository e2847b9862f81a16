//! Daily → weekly OHLCV aggregation.
//!
//! Calendar weeks end on Friday; Saturday/Sunday bars roll into the
//! following week. Per week: open = first, high = max, low = min,
//! close = last, volume = sum. Weeks with no contributing bars simply do
//! not appear, and the weekly bar carries its Friday as date — which makes
//! the aggregation idempotent on already-weekly input.

use crate::domain::Bar;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// The Friday that closes the calendar week containing `date`.
pub fn week_ending_friday(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday() as i64; // Mon = 0 … Sun = 6
    let offset = if weekday <= 4 {
        4 - weekday
    } else {
        11 - weekday
    };
    date + Duration::days(offset)
}

/// Aggregate a daily series into weekly bars.
pub fn resample_weekly(daily: &[Bar]) -> Vec<Bar> {
    let mut weeks: BTreeMap<NaiveDate, Vec<&Bar>> = BTreeMap::new();
    for bar in daily {
        weeks.entry(week_ending_friday(bar.date)).or_default().push(bar);
    }

    weeks
        .into_iter()
        .map(|(friday, bars)| {
            let mut high = f64::NEG_INFINITY;
            let mut low = f64::INFINITY;
            let mut volume = 0u64;
            for bar in &bars {
                high = high.max(bar.high);
                low = low.min(bar.low);
                volume += bar.volume;
            }
            Bar {
                date: friday,
                open: bars[0].open,
                high,
                low,
                close: bars[bars.len() - 1].close,
                volume,
            }
        })
        .collect()
}
