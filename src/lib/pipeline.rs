//! End-to-end extraction: input BAM to grouped output BAM and read data table.
//!
//! [`run_extract`] wires the pieces together:
//!
//! ```text
//! calling thread                      telbam-writer thread
//! ──────────────                      ────────────────────
//! RecordProducer::scan       ──┐
//!   wait for the consumer      │      RecordConsumer::run
//! RecordProducer::scan_for   ──┼────>   groups flushed as they complete
//! EnvelopeSender::terminate  ──┘      RecordConsumer::finish
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use crate::bam_io::create_bam_reader;
use crate::consumer::{ConsumerSummary, RecordConsumer};
use crate::output::OutputSink;
use crate::producer::{RecordProducer, RecoveryHandles};
use crate::queue::record_queue;
use crate::telomere::{ContentPredicate, DEFAULT_MIN_REPEATS, TelomereContent};
use crate::validation::{validate_at_least, validate_file_exists, validate_gzip_output};

/// Default capacity of the record queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Settings for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Input BAM
    pub input: PathBuf,
    /// Output BAM
    pub output: PathBuf,
    /// Optional gzip TSV read data table
    pub read_data: Option<PathBuf>,
    /// BGZF worker threads for reading and writing
    pub threads: usize,
    /// Maximum number of envelopes waiting in the record queue
    pub queue_capacity: usize,
    /// Consecutive telomeric repeats required for a read to open a group
    pub min_telomere_repeats: usize,
    /// Whether to rescan the input for mates of incomplete groups
    pub mate_recovery: bool,
}

impl ExtractConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            read_data: None,
            threads: 1,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            min_telomere_repeats: DEFAULT_MIN_REPEATS,
            mate_recovery: true,
        }
    }

    /// Sets the read data table path.
    #[must_use]
    pub fn with_read_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_data = Some(path.into());
        self
    }

    /// Validates paths and numeric settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is missing, the read data path is not `.gz`, or a count
    /// is zero.
    pub fn validate(&self) -> crate::errors::Result<()> {
        validate_file_exists(&self.input, "Input BAM")?;
        validate_gzip_output(self.read_data.as_deref(), "read-data")?;
        validate_at_least(self.threads, 1, "threads")?;
        validate_at_least(self.queue_capacity, 1, "queue-capacity")?;
        validate_at_least(self.min_telomere_repeats, 1, "min-telomere-repeats")?;
        Ok(())
    }
}

/// Runs an extraction with the telomeric content predicate.
///
/// # Errors
///
/// Returns an error if the config is invalid, an input or output cannot be opened, a group
/// violates its invariants, or an output cannot be written.
pub fn run_extract(config: &ExtractConfig) -> Result<ConsumerSummary> {
    let predicate = Arc::new(TelomereContent::new(config.min_telomere_repeats));
    run_extract_with(config, predicate)
}

/// Runs an extraction with a caller-supplied content predicate.
///
/// The producer runs on the calling thread and the consumer on a thread named
/// `telbam-writer`. If the producer fails, the consumer is cancelled and still closes its
/// outputs. A consumer error takes precedence over the producer error it caused.
///
/// # Errors
///
/// See [`run_extract`].
pub fn run_extract_with(
    config: &ExtractConfig,
    predicate: Arc<dyn ContentPredicate>,
) -> Result<ConsumerSummary> {
    config.validate()?;

    info!("Input: {}", config.input.display());
    info!("Output: {}", config.output.display());
    if let Some(path) = &config.read_data {
        info!("Read data: {}", path.display());
    }

    let (_, header) = create_bam_reader(&config.input, 1)?;
    let sink = OutputSink::create(
        &config.output,
        header,
        config.threads,
        config.read_data.as_deref(),
        Arc::clone(&predicate),
    )?;

    let (sender, receiver) = record_queue(config.queue_capacity);
    let cancel = receiver.cancel_handle();
    let consumer = RecordConsumer::new(receiver, sink);
    let handles = RecoveryHandles {
        table: consumer.table(),
        mode: consumer.recovery_mode(),
        progress: consumer.progress(),
    };

    let writer = thread::Builder::new()
        .name("telbam-writer".to_string())
        .spawn(move || consumer.run())
        .context("Failed to spawn the writer thread")?;

    let producer = RecordProducer::new(&config.input, config.threads, predicate);
    let produced = producer.run(sender, config.mate_recovery.then_some(&handles));
    if let Err(e) = &produced {
        warn!("Producer failed, cancelling the writer: {e:#}");
        cancel.cancel();
    }

    let consumed = writer.join().map_err(|_| anyhow!("The writer thread panicked"))?;
    match (produced, consumed) {
        (_, Err(e)) | (Err(e), Ok(_)) => Err(e),
        (Ok(()), Ok(summary)) => Ok(summary),
    }
}
