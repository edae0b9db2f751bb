//! Scans the input BAM and feeds the record queue.
//!
//! The first pass pushes every named, non-secondary record together with the content
//! predicate's verdict. The optional mate recovery pass rescans the input for records whose
//! names are still incomplete once the first pass has been fully consumed, picking up mates
//! that went by before their group was opened.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashSet;
use anyhow::{Context, Result};
use log::info;
use noodles::sam::alignment::RecordBuf;

use crate::bam_io::create_bam_reader;
use crate::consumer::{ConsumerProgress, RecoveryMode};
use crate::group_table::SharedGroupTable;
use crate::logging::format_count;
use crate::progress::ProgressTracker;
use crate::sam::read_name;
use crate::queue::EnvelopeSender;
use crate::telomere::ContentPredicate;

/// Handles the producer needs to coordinate mate recovery with the consumer.
#[derive(Debug, Clone)]
pub struct RecoveryHandles {
    /// The consumer's open groups
    pub table: SharedGroupTable,
    /// The consumer's recovery switch
    pub mode: RecoveryMode,
    /// The consumer's progress through the queue
    pub progress: Arc<ConsumerProgress>,
}

/// Sequential scanner over an input BAM.
pub struct RecordProducer {
    input: PathBuf,
    threads: usize,
    predicate: Arc<dyn ContentPredicate>,
    progress_interval: u64,
}

impl RecordProducer {
    /// Creates a producer over `input` using `threads` BGZF workers.
    #[must_use]
    pub fn new(input: &Path, threads: usize, predicate: Arc<dyn ContentPredicate>) -> Self {
        Self { input: input.to_path_buf(), threads, predicate, progress_interval: 1_000_000 }
    }

    /// Sets how many records pass between progress log lines.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Runs the first pass, the recovery pass when `recovery` is set, and sends termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or the consumer stops receiving. The
    /// sender is dropped without termination in that case.
    pub fn run(&self, sender: EnvelopeSender, recovery: Option<&RecoveryHandles>) -> Result<()> {
        let pushed = self.scan(&sender)?;
        if let Some(handles) = recovery {
            self.recover_mates(&sender, handles, pushed)?;
        }
        sender.terminate()
    }

    /// Pushes every named, non-secondary record. Returns the number of envelopes pushed.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or the consumer stops receiving.
    pub fn scan(&self, sender: &EnvelopeSender) -> Result<u64> {
        self.scan_with(sender, "Scanned records", |_| true)
    }

    /// Waits for the consumer to route the first pass, then rescans for incomplete names.
    ///
    /// Recovery mode is switched on before the rescan so that no new group is opened.
    /// Returns the number of envelopes pushed by the rescan.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or the consumer stops receiving.
    pub fn recover_mates(
        &self,
        sender: &EnvelopeSender,
        handles: &RecoveryHandles,
        pushed: u64,
    ) -> Result<u64> {
        handles.progress.wait_for(pushed);
        let names = handles.table.incomplete_names();
        handles.mode.set(true);

        if names.is_empty() {
            info!("No incomplete read groups, skipping mate recovery");
            return Ok(0);
        }

        info!("Recovering mates for {} incomplete read groups", format_count(names.len() as u64));
        self.scan_for(sender, &names)
    }

    /// Pushes every named, non-secondary record whose name is in `names`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or the consumer stops receiving.
    pub fn scan_for(&self, sender: &EnvelopeSender, names: &AHashSet<String>) -> Result<u64> {
        self.scan_with(sender, "Rescanned records", |record| has_name_in(record, names))
    }

    fn scan_with<F>(&self, sender: &EnvelopeSender, message: &str, keep: F) -> Result<u64>
    where
        F: Fn(&RecordBuf) -> bool,
    {
        let (mut reader, header) = create_bam_reader(&self.input, self.threads)?;
        let progress = ProgressTracker::new(message).with_interval(self.progress_interval);
        let mut pushed = 0u64;

        for result in reader.record_bufs(&header) {
            let record = result.with_context(|| {
                format!("Failed to read record from: {}", self.input.display())
            })?;
            progress.record(1);

            if record.name().is_none() || record.flags().is_secondary() || !keep(&record) {
                continue;
            }

            let interesting = self.predicate.has_content(record.sequence().as_ref());
            sender.push(record, interesting)?;
            pushed += 1;
        }

        progress.log_final();
        info!("{message}: pushed {} records to the queue", format_count(pushed));
        Ok(pushed)
    }
}

/// Whether the name of `record`, decoded as [`read_name`] does, is in `names`.
fn has_name_in(record: &RecordBuf, names: &AHashSet<String>) -> bool {
    read_name(record).is_some_and(|name| names.contains(&name))
}
