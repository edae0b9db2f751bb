//! Enhanced logging utilities for formatted output.
//!
//! This module provides consistent, user-friendly logging utilities for counts,
//! progress tracking, and the end-of-run group summary.

use std::time::{Duration, Instant};

use crate::consumer::{ConsumerSummary, LoopExit};

/// Formats a count with thousands separators (e.g. `1234567` -> `"1,234,567"`).
///
/// # Examples
///
/// ```
/// use telbam_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a percentage with specified decimal places.
///
/// # Examples
///
/// ```
/// use telbam_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration in human-readable form (e.g. "45s", "2m 15s", "1h 30m").
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 { format!("{mins}m") } else { format!("{mins}m {remaining_secs}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a rate (items per second).
///
/// Rates below one item per second are reported per minute instead.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} items/s", format_count(count));
    }

    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} items/s", format_count(rate as u64))
    } else {
        let items_per_min = count as f64 / (secs / 60.0);
        format!("{items_per_min:.1} items/min")
    }
}

/// Logs the end-of-run read group summary.
///
/// The first line is the one operators grep for: total groups written, split into
/// complete and incomplete.
#[allow(clippy::cast_precision_loss)]
pub fn log_consumer_summary(summary: &ConsumerSummary) {
    log::info!(
        "wrote {} read groups, complete({}), incomplete({})",
        format_count(summary.total_groups()),
        format_count(summary.completed_groups),
        format_count(summary.incomplete_groups)
    );
    log::info!("  Envelopes processed: {}", format_count(summary.processed_envelopes));
    log::info!("  Reads accepted: {}", format_count(summary.accepted_reads));

    if summary.total_groups() > 0 {
        let complete_rate = summary.completed_groups as f64 / summary.total_groups() as f64;
        log::info!("  Complete groups: {}", format_percent(complete_rate, 2));
    }

    if summary.exit == LoopExit::Cancelled {
        log::warn!("Record queue was cancelled before the end-of-stream marker arrived");
    }
}

/// Operation timing and summary helper.
///
/// # Examples
///
/// ```no_run
/// use telbam_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Scanning reads");
///
/// // ... do work ...
///
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Logs the completion with item count and rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.start_time.elapsed();
        log::info!(
            "{} completed: {} in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}
