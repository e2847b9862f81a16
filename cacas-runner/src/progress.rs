//! Progress callbacks for multi-asset operations.

use cacas_core::signals::ConvergenceRecord;

/// Callback interface for batch scans and backtests.
///
/// Implementations must be `Sync`: batches fan out across worker threads
/// and report concurrently.
pub trait ScanProgress: Sync {
    /// Called when an instrument's classification starts.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when an instrument was classified.
    fn on_classified(&self, ticker: &str, record: &ConvergenceRecord);

    /// Called when an instrument was skipped for missing data.
    fn on_skipped(&self, ticker: &str);

    /// Called once when the whole batch is done.
    fn on_batch_complete(&self, processed: usize, skipped: usize, total: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl ScanProgress for StdoutProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        println!("[{}/{}] Analisando {ticker}...", index + 1, total);
    }

    fn on_classified(&self, ticker: &str, record: &ConvergenceRecord) {
        println!("  {ticker}: {}", record.status.label());
    }

    fn on_skipped(&self, ticker: &str) {
        println!("  {ticker}: sem dados");
    }

    fn on_batch_complete(&self, processed: usize, skipped: usize, total: usize) {
        println!("\nScan concluído: {processed}/{total} analisados, {skipped} sem dados");
    }
}

/// No-op reporter for library callers and tests.
pub struct SilentProgress;

impl ScanProgress for SilentProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}
    fn on_classified(&self, _ticker: &str, _record: &ConvergenceRecord) {}
    fn on_skipped(&self, _ticker: &str) {}
    fn on_batch_complete(&self, _processed: usize, _skipped: usize, _total: usize) {}
}
