use tracing::{debug, info};

/// Receives row counts while the paginator runs. Purely advisory.
pub trait ProgressObserver: Send + Sync {
    fn on_start(&self, _target: usize) {}

    /// Called after every page with the cumulative count
    fn on_page(&self, fetched: usize, target: usize);

    fn on_finish(&self, _fetched: usize, _target: usize) {}
}

/// Reports progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_start(&self, target: usize) {
        info!("{} items being transferred. Please wait...", target);
    }

    fn on_page(&self, fetched: usize, target: usize) {
        let pct = if target == 0 {
            100.0
        } else {
            fetched as f64 * 100.0 / target as f64
        };
        debug!("Fetched {}/{} rows ({:.0}%)", fetched, target, pct);
    }

    fn on_finish(&self, fetched: usize, target: usize) {
        info!("Transferred {}/{} rows", fetched, target);
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_page(&self, _fetched: usize, _target: usize) {}
}
