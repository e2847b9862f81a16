//! Synthetic bar series for integration tests and benchmarks.
//!
//! Dates advance over business days only (Monday–Friday), so the series
//! resample cleanly into Friday-ended weeks.

use crate::domain::Bar;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// First business day used by all generators (a Monday).
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 6).expect("valid fixed date")
}

fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next += Duration::days(1);
    }
    next
}

/// Bars from explicit closes: open = previous close, high/low bracket the
/// move by 1.0, constant volume.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let mut date = base_date();
    let mut bars = Vec::with_capacity(closes.len());
    for (i, &close) in closes.iter().enumerate() {
        let open = if i == 0 { close } else { closes[i - 1] };
        bars.push(Bar {
            date,
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 1000,
        });
        date = next_business_day(date);
    }
    bars
}

/// Linearly drifting closes: start, start+step, start+2·step, …
pub fn trending_bars(n: usize, start: f64, step: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
    bars_from_closes(&closes)
}

/// Seeded geometric random walk, clamped away from zero.
pub fn random_walk_bars(n: usize, start: f64, daily_move: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close = start;
    let mut closes = Vec::with_capacity(n);
    for _ in 0..n {
        let step: f64 = rng.gen_range(-daily_move..daily_move);
        close = (close * (1.0 + step)).max(0.01);
        closes.push(close);
    }
    bars_from_closes(&closes)
}
