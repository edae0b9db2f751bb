//! Progress tracking for long scans.
//!
//! [`ProgressTracker`] keeps an atomic count and logs a line each time the count crosses a
//! multiple of its interval. The producer creates one tracker per scan pass.

use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe progress tracker that logs at regular intervals.
///
/// # Example
/// ```
/// use telbam_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("Scanned records").with_interval(100);
/// for _ in 0..250 {
///     tracker.record(1); // logs at 100 and 200
/// }
/// tracker.log_final(); // logs "Scanned records 250 (complete)"
/// ```
pub struct ProgressTracker {
    interval: u64,
    message: String,
    count: AtomicU64,
}

impl ProgressTracker {
    /// Creates a tracker with the default interval of 1,000,000.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { interval: 1_000_000, message: message.into(), count: AtomicU64::new(0) }
    }

    /// Sets the logging interval. Zero is treated as one.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Adds `additional` to the count, logging once per interval boundary crossed.
    ///
    /// Returns `true` if the new count sits exactly on an interval boundary.
    pub fn record(&self, additional: u64) -> bool {
        let prev = self.count.fetch_add(additional, Ordering::Relaxed);
        let new_count = prev + additional;

        for milestone in (prev / self.interval + 1)..=(new_count / self.interval) {
            info!("{} {}", self.message, milestone * self.interval);
        }

        new_count > 0 && new_count % self.interval == 0
    }

    /// Logs the final count unless the last [`record`](Self::record) call already did.
    pub fn log_final(&self) {
        let count = self.count();
        if count > 0 && count % self.interval != 0 {
            info!("{} {} (complete)", self.message, count);
        }
    }

    /// The current count.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
