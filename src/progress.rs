//! Progress tracking for archive runs.
//!
//! A [`RunCounters`] pairs the fixed total from the counting pass with an
//! atomic count of delivered entries, and logs a milestone line at a fixed
//! interval. The counters feed reporting only; pipeline correctness never
//! depends on them.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// Entry tally for one archiving run.
#[derive(Debug)]
pub struct RunCounters {
    /// Entries the counting pass expects the dispatch pass to schedule.
    total: u64,
    /// Entries successfully handed to the archiver so far.
    processed: AtomicU64,
    /// Delivered-entry interval between milestone log lines.
    interval: u64,
}

impl RunCounters {
    /// `total` comes from the counting pass; a milestone is logged every
    /// `interval` delivered entries.
    pub fn new(total: u64, interval: u64) -> Self {
        Self {
            total,
            processed: AtomicU64::new(0),
            interval: interval.max(1),
        }
    }

    /// Record one successful hand-off to the archiver (zero-overhead atomic
    /// increment outside milestone boundaries).
    pub fn record_delivered(&self) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if processed % self.interval == 0 {
            info!(processed, total = self.total, "progress");
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counts_deliveries() {
        let counters = RunCounters::new(10, 1000);

        counters.record_delivered();
        counters.record_delivered();

        assert_eq!(counters.processed(), 2);
        assert_eq!(counters.total(), 10);
    }

    #[test]
    fn test_zero_interval_is_safe() {
        let counters = RunCounters::new(1, 0);
        counters.record_delivered();
        assert_eq!(counters.processed(), 1);
    }

    #[test]
    fn test_multithreaded_counting() {
        let counters = Arc::new(RunCounters::new(1000, 1000));

        let mut handles = vec![];

        // Spawn 4 worker threads, 250 deliveries each
        for _ in 0..4 {
            let counters = Arc::clone(&counters);
            handles.push(thread::spawn(move || {
                for _ in 0..250 {
                    counters.record_delivered();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counters.processed(), 1000);
    }
}
