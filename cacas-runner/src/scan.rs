//! Parallel multi-asset convergence scan.
//!
//! Each instrument's classification is independent, so the scan fans out
//! across the rayon pool and merges into one priority-sorted result.
//! Instruments missing either frame are skipped and reported, never fatal.

use crate::progress::ScanProgress;
use cacas_core::domain::Signal;
use cacas_core::frame::ChannelFrame;
use cacas_core::signals::{classify, ConvergenceRecord, ConvergenceStatus};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Computed frames for one instrument. Either side may be absent.
#[derive(Debug, Clone, Default)]
pub struct AssetFrames {
    pub daily: Option<ChannelFrame>,
    pub weekly: Option<ChannelFrame>,
}

/// One classified instrument.
#[derive(Debug, Clone)]
pub struct ScanHit {
    pub ticker: String,
    pub record: ConvergenceRecord,
}

/// Result of a multi-asset scan: classified hits (priority-sorted) plus
/// the tickers skipped for missing data.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub hits: Vec<ScanHit>,
    pub skipped: Vec<String>,
}

/// Classify every instrument that has both frames, in parallel.
pub fn scan_assets(
    assets: &BTreeMap<String, AssetFrames>,
    progress: &dyn ScanProgress,
) -> ScanOutcome {
    let total = assets.len();
    let entries: Vec<(&String, &AssetFrames)> = assets.iter().collect();

    let classified: Vec<(String, Option<ConvergenceRecord>)> = entries
        .into_par_iter()
        .enumerate()
        .map(|(index, (ticker, frames))| {
            progress.on_start(ticker, index, total);
            let record = match (&frames.daily, &frames.weekly) {
                (Some(daily), Some(weekly)) => {
                    let record = classify(daily, weekly);
                    progress.on_classified(ticker, &record);
                    Some(record)
                }
                _ => {
                    progress.on_skipped(ticker);
                    None
                }
            };
            (ticker.clone(), record)
        })
        .collect();

    let mut outcome = ScanOutcome::default();
    for (ticker, record) in classified {
        match record {
            Some(record) => outcome.hits.push(ScanHit { ticker, record }),
            None => outcome.skipped.push(ticker),
        }
    }
    progress.on_batch_complete(outcome.hits.len(), outcome.skipped.len(), total);

    sort_by_priority(&mut outcome.hits);
    outcome
}

/// Stable sort by status priority; equal-priority hits keep ticker order.
pub fn sort_by_priority(hits: &mut [ScanHit]) {
    hits.sort_by_key(|hit| hit.record.status.priority());
}

/// Hits whose status is in the given set.
pub fn filter_by_status<'a>(
    hits: &'a [ScanHit],
    statuses: &[ConvergenceStatus],
) -> Vec<&'a ScanHit> {
    hits.iter()
        .filter(|hit| statuses.contains(&hit.record.status))
        .collect()
}

/// Hits in a buy state: SetupBuy or ConvergentBuy.
pub fn buy_signals(hits: &[ScanHit]) -> Vec<&ScanHit> {
    hits.iter().filter(|hit| hit.record.status.is_buy()).collect()
}

/// Hits in a sell state: SetupSell or ConvergentSell.
pub fn sell_signals(hits: &[ScanHit]) -> Vec<&ScanHit> {
    hits.iter().filter(|hit| hit.record.status.is_sell()).collect()
}

/// Hits still waiting for confirmation.
pub fn waiting_signals(hits: &[ScanHit]) -> Vec<&ScanHit> {
    hits.iter()
        .filter(|hit| hit.record.status.is_waiting())
        .collect()
}

/// Export row with the stable column names consumed by the presentation
/// layer.
#[derive(Debug, Clone, Serialize)]
pub struct ScanCsvRow {
    pub ticker: String,
    pub semanal: Option<i8>,
    pub diario: Option<i8>,
    pub convergente: bool,
    pub tipo: String,
    pub status: String,
    pub descricao: String,
}

impl From<&ScanHit> for ScanCsvRow {
    fn from(hit: &ScanHit) -> Self {
        let record = &hit.record;
        Self {
            ticker: hit.ticker.clone(),
            semanal: record.weekly_signal.map(Signal::as_int),
            diario: record.daily_signal.map(Signal::as_int),
            convergente: record.is_convergent,
            tipo: record.convergence_type.label().to_string(),
            status: record.status.label().to_string(),
            descricao: record.description.clone(),
        }
    }
}

/// Write scan hits as CSV with the stable header.
pub fn write_csv<W: Write>(writer: W, hits: &[ScanHit]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for hit in hits {
        csv_writer.serialize(ScanCsvRow::from(hit))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use cacas_core::data::resample_weekly;
    use cacas_core::indicators::{CacasChannel, ChannelParams};
    use cacas_core::synthetic::trending_bars;

    fn fast_channel() -> CacasChannel {
        CacasChannel::new(ChannelParams {
            upper: 3,
            under: 3,
            ema: 3,
        })
        .unwrap()
    }

    fn bullish_frames() -> AssetFrames {
        let channel = fast_channel();
        let daily_bars = trending_bars(60, 100.0, 1.0);
        AssetFrames {
            weekly: Some(channel.compute(resample_weekly(&daily_bars))),
            daily: Some(channel.compute(daily_bars)),
        }
    }

    fn bearish_frames() -> AssetFrames {
        let channel = fast_channel();
        let daily_bars = trending_bars(60, 200.0, -1.0);
        AssetFrames {
            weekly: Some(channel.compute(resample_weekly(&daily_bars))),
            daily: Some(channel.compute(daily_bars)),
        }
    }

    #[test]
    fn missing_weekly_series_is_skipped_not_fatal() {
        let mut assets = BTreeMap::new();
        assets.insert("AAAA".to_string(), bullish_frames());
        assets.insert("BBBB".to_string(), bearish_frames());
        let mut broken = bullish_frames();
        broken.weekly = None;
        assets.insert("CCCC".to_string(), broken);

        let outcome = scan_assets(&assets, &SilentProgress);
        assert_eq!(outcome.hits.len(), 2);
        assert_eq!(outcome.skipped, vec!["CCCC".to_string()]);
    }

    #[test]
    fn hits_come_back_priority_sorted() {
        let mut assets = BTreeMap::new();
        assets.insert("DOWN".to_string(), bearish_frames());
        assets.insert("UP".to_string(), bullish_frames());

        let outcome = scan_assets(&assets, &SilentProgress);
        assert_eq!(outcome.hits.len(), 2);
        // ConvergentBuy (3) sorts ahead of ConvergentSell (4).
        assert_eq!(outcome.hits[0].ticker, "UP");
        assert_eq!(outcome.hits[0].record.status, ConvergenceStatus::ConvergentBuy);
        assert_eq!(outcome.hits[1].record.status, ConvergenceStatus::ConvergentSell);
    }

    #[test]
    fn priority_sort_is_stable_within_a_status() {
        let mut assets = BTreeMap::new();
        assets.insert("BBBB".to_string(), bullish_frames());
        assets.insert("AAAA".to_string(), bullish_frames());
        assets.insert("CCCC".to_string(), bullish_frames());

        let outcome = scan_assets(&assets, &SilentProgress);
        let tickers: Vec<&str> = outcome.hits.iter().map(|h| h.ticker.as_str()).collect();
        assert_eq!(tickers, ["AAAA", "BBBB", "CCCC"]);
    }

    #[test]
    fn filters_partition_by_status_sets() {
        let mut assets = BTreeMap::new();
        assets.insert("UP".to_string(), bullish_frames());
        assets.insert("DOWN".to_string(), bearish_frames());

        let outcome = scan_assets(&assets, &SilentProgress);
        assert_eq!(buy_signals(&outcome.hits).len(), 1);
        assert_eq!(sell_signals(&outcome.hits).len(), 1);
        assert_eq!(waiting_signals(&outcome.hits).len(), 0);

        let convergent_buys =
            filter_by_status(&outcome.hits, &[ConvergenceStatus::ConvergentBuy]);
        assert_eq!(convergent_buys.len(), 1);
        assert_eq!(convergent_buys[0].ticker, "UP");
    }

    #[test]
    fn csv_export_uses_stable_column_names() {
        let mut assets = BTreeMap::new();
        assets.insert("UP".to_string(), bullish_frames());
        let outcome = scan_assets(&assets, &SilentProgress);

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &outcome.hits).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "ticker,semanal,diario,convergente,tipo,status,descricao"
        );
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("UP,1,1,true,ALTA,"));
    }

    #[test]
    fn empty_universe_scans_to_empty_outcome() {
        let assets: BTreeMap<String, AssetFrames> = BTreeMap::new();
        let outcome = scan_assets(&assets, &SilentProgress);
        assert!(outcome.hits.is_empty());
        assert!(outcome.skipped.is_empty());
    }
}
