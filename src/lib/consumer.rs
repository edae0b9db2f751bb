//! The record consumer: routes queued records into read groups and flushes them.
//!
//! A single [`RecordConsumer`] owns the [`OutputSink`] and is the only writer of the shared
//! [`GroupTable`](crate::group_table::GroupTable). For each record it:
//!
//! 1. ignores records for unseen names while mate recovery is running, or when the producer
//!    found nothing interesting in them;
//! 2. otherwise opens (or finds) the read group and accepts the record unless already present;
//! 3. checks the group's invariants, failing the run if they are broken;
//! 4. writes and removes the group the moment it is complete.
//!
//! When the loop ends, by [`Envelope::Terminate`] or by cancellation, [`RecordConsumer::finish`]
//! flushes every group that never completed, closes the BAM, writes the read data table and
//! reports counts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use log::warn;
use noodles::sam::alignment::RecordBuf;
use parking_lot::{Condvar, Mutex};

use crate::group_table::SharedGroupTable;
use crate::logging::log_consumer_summary;
use crate::output::OutputSink;
use crate::queue::{Envelope, EnvelopeReceiver, Take};
use crate::read_group::ReadGroup;
use crate::sam::{cigar_to_string, read_name, supplementary_data};

/// Why the consumer loop stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopExit {
    /// The producer sent the end-of-stream marker
    #[default]
    Terminated,
    /// The take was cancelled, or every sender was dropped
    Cancelled,
}

/// Counts reported once the consumer has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerSummary {
    /// Groups written the moment they became complete
    pub completed_groups: u64,
    /// Groups still open at the drain and written anyway
    pub incomplete_groups: u64,
    /// Records accepted into a group
    pub accepted_reads: u64,
    /// Record envelopes taken off the queue
    pub processed_envelopes: u64,
    /// How the loop ended
    pub exit: LoopExit,
}

impl ConsumerSummary {
    /// Every group written, complete or not.
    #[must_use]
    pub fn total_groups(&self) -> u64 {
        self.completed_groups + self.incomplete_groups
    }
}

/// Switch that puts the consumer into mate recovery.
///
/// While enabled, records for names without an open group are ignored even if they are
/// interesting. Open groups keep accepting records.
#[derive(Debug, Clone, Default)]
pub struct RecoveryMode {
    enabled: Arc<AtomicBool>,
}

impl RecoveryMode {
    /// Creates a switch that starts disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recovery mode.
    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Returns `true` while recovery mode is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    processed: u64,
    finished: bool,
}

/// How far the consumer has worked through the queue.
///
/// The producer uses [`wait_for`](Self::wait_for) to know that everything it pushed has been
/// routed before it reads the incomplete-name set.
#[derive(Debug, Default)]
pub struct ConsumerProgress {
    state: Mutex<ProgressState>,
    changed: Condvar,
}

impl ConsumerProgress {
    /// Returns `true` once the consumer has stopped taking envelopes.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }

    /// Blocks until at least `count` envelopes are processed or the consumer stops.
    ///
    /// Returns the processed count at wake-up.
    pub fn wait_for(&self, count: u64) -> u64 {
        let mut state = self.state.lock();
        while state.processed < count && !state.finished {
            self.changed.wait(&mut state);
        }
        state.processed
    }

    fn record_processed(&self) {
        self.state.lock().processed += 1;
        self.changed.notify_all();
    }

    fn mark_finished(&self) {
        self.state.lock().finished = true;
        self.changed.notify_all();
    }
}

// Marks the progress finished however the consumer goes away, including unwinding.
#[derive(Debug)]
struct FinishGuard(Arc<ConsumerProgress>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.mark_finished();
    }
}

/// Single-threaded consumer of the record queue.
pub struct RecordConsumer {
    receiver: EnvelopeReceiver,
    table: SharedGroupTable,
    recovery: RecoveryMode,
    progress: FinishGuard,
    sink: OutputSink,
    completed_groups: u64,
    accepted_reads: u64,
    processed_envelopes: u64,
}

impl RecordConsumer {
    /// Creates a consumer that takes from `receiver` and writes to `sink`.
    #[must_use]
    pub fn new(receiver: EnvelopeReceiver, sink: OutputSink) -> Self {
        Self {
            receiver,
            table: SharedGroupTable::new(),
            recovery: RecoveryMode::new(),
            progress: FinishGuard(Arc::new(ConsumerProgress::default())),
            sink,
            completed_groups: 0,
            accepted_reads: 0,
            processed_envelopes: 0,
        }
    }

    /// Handle on the open groups, readable from any thread.
    #[must_use]
    pub fn table(&self) -> SharedGroupTable {
        self.table.clone()
    }

    /// Handle on the recovery mode switch.
    #[must_use]
    pub fn recovery_mode(&self) -> RecoveryMode {
        self.recovery.clone()
    }

    /// Handle on the consumer's progress.
    #[must_use]
    pub fn progress(&self) -> Arc<ConsumerProgress> {
        Arc::clone(&self.progress.0)
    }

    /// Takes envelopes until termination or cancellation, then runs [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// Returns [`TelbamError::InvariantViolation`](crate::errors::TelbamError) if a group is
    /// found inconsistent. The output BAM is closed first and no drain happens. Output errors
    /// from the flush or the finish sequence are returned as well.
    pub fn run(mut self) -> Result<ConsumerSummary> {
        let exit = loop {
            match self.receiver.take() {
                Take::Cancelled => break LoopExit::Cancelled,
                Take::Envelope(Envelope::Terminate) => break LoopExit::Terminated,
                Take::Envelope(Envelope::Record { record, has_interesting_content }) => {
                    let routed = self.process_record(record, has_interesting_content);
                    self.processed_envelopes += 1;
                    self.progress.0.record_processed();
                    if let Err(e) = routed {
                        return Err(close_after_error(self.sink, e));
                    }
                }
            }
        };

        self.finish(exit)
    }

    /// Routes one record through the group state machine.
    fn process_record(&mut self, record: RecordBuf, has_interesting_content: bool) -> Result<()> {
        let Some(name) = read_name(&record) else {
            return Ok(());
        };

        let completed = {
            let mut table = self.table.write();
            if !table.contains(&name)
                && (self.recovery.is_enabled() || !has_interesting_content)
            {
                return Ok(());
            }

            let group = table.open(&name);
            if !group.contains(&record) && group.accept_read(record) {
                self.accepted_reads += 1;
            }

            if group.is_empty() {
                // first record was rejected, nothing to keep open
                table.remove(&name);
                return Ok(());
            }

            group.check_invariant()?;
            if group.is_complete() { table.remove(&name) } else { None }
        };

        if let Some(group) = completed {
            self.sink.write_group(&group, true)?;
            self.completed_groups += 1;
        }
        Ok(())
    }

    /// Flushes the groups that never completed, closes the outputs and reports counts.
    ///
    /// Consumes the consumer, so it runs at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if a group cannot be written, the BAM cannot be closed, or the read data
    /// table cannot be written. The BAM is closed before the read data table is attempted.
    pub fn finish(self, exit: LoopExit) -> Result<ConsumerSummary> {
        let Self {
            table,
            progress,
            mut sink,
            completed_groups,
            accepted_reads,
            processed_envelopes,
            ..
        } = self;
        drop(progress);

        let remaining = table.write().drain();
        for group in &remaining {
            log_incomplete_group(group);
            if let Err(e) = sink.write_group(group, false) {
                return Err(close_after_error(sink, e));
            }
        }

        if let Some(read_data) = sink.close()? {
            read_data.write()?;
        }

        let summary = ConsumerSummary {
            completed_groups,
            incomplete_groups: remaining.len() as u64,
            accepted_reads,
            processed_envelopes,
            exit,
        };
        log_consumer_summary(&summary);
        Ok(summary)
    }
}

/// Closes the BAM after a fatal error and returns the error.
fn close_after_error(sink: OutputSink, error: anyhow::Error) -> anyhow::Error {
    if let Err(close_error) = sink.close() {
        warn!("{close_error:#}");
    }
    error
}

fn log_incomplete_group(group: &ReadGroup) {
    warn!("incomplete read group: readId({}) {}", group.name(), group.completeness());
    for record in group.all_reads() {
        let flags = record.flags();
        warn!(
            "  readId({}) cigar({}) strand({}) supplementary({}) suppData({})",
            group.name(),
            cigar_to_string(record.cigar()),
            if flags.is_reverse_complemented() { '-' } else { '+' },
            flags.is_supplementary(),
            supplementary_data(record).as_deref().unwrap_or("none"),
        );
    }
}
