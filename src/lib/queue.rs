//! The bounded record queue between the producer and the consumer.
//!
//! ```text
//! ┌──────────────┐  Envelope   ┌─────────────────┐   take()   ┌──────────────┐
//! │   Producer   │────────────>│ bounded channel │───────────>│   Consumer   │
//! └──────────────┘             └─────────────────┘            └──────────────┘
//!                                                   cancel ──────────^
//! ```
//!
//! The producer blocks when the queue is full. The end of the stream is an explicit
//! [`Envelope::Terminate`]; cancellation travels on a separate channel so that it can
//! interrupt a consumer blocked on an empty queue.

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender, bounded, select};
use noodles::sam::alignment::RecordBuf;

/// One unit of work on the record queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// A record to route into its read group.
    Record {
        /// The alignment record
        record: RecordBuf,
        /// Whether the producer found the content of interest in the record's bases
        has_interesting_content: bool,
    },
    /// No further envelopes will be sent.
    Terminate,
}

/// Outcome of a blocking [`EnvelopeReceiver::take`].
#[derive(Debug, PartialEq)]
pub enum Take {
    /// The next envelope in the queue
    Envelope(Envelope),
    /// The take was interrupted by cancellation, or every sender went away
    Cancelled,
}

/// Creates a record queue holding at most `capacity` envelopes.
///
/// A capacity of zero is treated as one.
#[must_use]
pub fn record_queue(capacity: usize) -> (EnvelopeSender, EnvelopeReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    let (cancel_tx, cancel_rx) = bounded(1);
    (EnvelopeSender { tx }, EnvelopeReceiver { rx, cancel_rx, cancel_tx })
}

/// Producer side of the record queue.
#[derive(Debug, Clone)]
pub struct EnvelopeSender {
    tx: Sender<Envelope>,
}

impl EnvelopeSender {
    /// Pushes a record, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer has stopped receiving.
    pub fn push(&self, record: RecordBuf, has_interesting_content: bool) -> Result<()> {
        self.send(Envelope::Record { record, has_interesting_content })
    }

    /// Sends the end-of-stream marker and closes this sender.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer has stopped receiving.
    pub fn terminate(self) -> Result<()> {
        self.send(Envelope::Terminate)
    }

    fn send(&self, envelope: Envelope) -> Result<()> {
        self.tx.send(envelope).map_err(|_| anyhow!("Record queue closed: the consumer has stopped"))
    }
}

/// Consumer side of the record queue.
#[derive(Debug)]
pub struct EnvelopeReceiver {
    rx: Receiver<Envelope>,
    cancel_rx: Receiver<()>,
    // keeps the cancel channel connected after every handle is dropped
    cancel_tx: Sender<()>,
}

impl EnvelopeReceiver {
    /// Returns a handle that interrupts [`take`](Self::take) from any thread.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle { tx: self.cancel_tx.clone() }
    }

    /// Blocks until an envelope is available or the queue is cancelled.
    ///
    /// A pending cancellation wins over queued envelopes. If every sender has been dropped
    /// without a [`Envelope::Terminate`], the take reports [`Take::Cancelled`].
    #[must_use]
    pub fn take(&self) -> Take {
        if self.cancel_rx.try_recv().is_ok() {
            return Take::Cancelled;
        }

        select! {
            recv(self.cancel_rx) -> _ => Take::Cancelled,
            recv(self.rx) -> envelope => envelope.map_or(Take::Cancelled, Take::Envelope),
        }
    }
}

/// Cooperative cancellation for a blocked consumer.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    /// Requests cancellation. Calling it more than once has no further effect.
    pub fn cancel(&self) {
        // a full channel already holds a pending cancellation
        let _ = self.tx.try_send(());
    }
}
