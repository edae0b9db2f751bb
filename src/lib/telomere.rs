//! Sequence content predicates.
//!
//! The producer evaluates a [`ContentPredicate`] on every scanned read to decide whether a read
//! may open a new read group. The default predicate, [`TelomereContent`], looks for runs of the
//! vertebrate telomeric hexamer.

/// The canonical telomeric repeat on the G-rich strand.
pub const TELOMERE_REPEAT: &[u8; 6] = b"TTAGGG";

/// The reverse complement of [`TELOMERE_REPEAT`].
pub const TELOMERE_REPEAT_RC: &[u8; 6] = b"CCCTAA";

/// Default number of consecutive repeats required to call a read telomeric.
pub const DEFAULT_MIN_REPEATS: usize = 4;

/// Decides whether a read's bases are worth grouping.
pub trait ContentPredicate: Send + Sync {
    /// Returns `true` if `sequence` has the content of interest.
    fn has_content(&self, sequence: &[u8]) -> bool;
}

/// Detects telomeric repeat content.
///
/// A sequence is telomeric if it contains at least `min_repeats` back-to-back copies of
/// `TTAGGG` or of `CCCTAA`. Matching ignores case.
///
/// # Examples
///
/// ```
/// use telbam_lib::telomere::{ContentPredicate, TelomereContent};
///
/// let predicate = TelomereContent::new(2);
/// assert!(predicate.has_content(b"ACttagggTTAGGGAC"));
/// assert!(predicate.has_content(b"CCCTAACCCTAA"));
/// assert!(!predicate.has_content(b"TTAGGGACTTAGGG"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelomereContent {
    min_repeats: usize,
}

impl TelomereContent {
    /// Creates a predicate requiring `min_repeats` consecutive repeats. Zero is treated as one.
    #[must_use]
    pub fn new(min_repeats: usize) -> Self {
        Self { min_repeats: min_repeats.max(1) }
    }

    /// The number of consecutive repeats required.
    #[must_use]
    pub fn min_repeats(&self) -> usize {
        self.min_repeats
    }

    /// Length of the longest back-to-back run of `motif` in `sequence`, counted in copies.
    fn longest_run(sequence: &[u8], motif: &[u8; 6]) -> usize {
        let k = motif.len();
        if sequence.len() < k {
            return 0;
        }

        // run[i] = copies ending at i, chained from run[i - k]
        let mut runs = vec![0usize; sequence.len()];
        let mut best = 0;
        for start in 0..=sequence.len() - k {
            if sequence[start..start + k].eq_ignore_ascii_case(motif) {
                let run = if start >= k { runs[start - k] + 1 } else { 1 };
                runs[start] = run;
                best = best.max(run);
            }
        }
        best
    }
}

impl Default for TelomereContent {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_REPEATS)
    }
}

impl ContentPredicate for TelomereContent {
    fn has_content(&self, sequence: &[u8]) -> bool {
        Self::longest_run(sequence, TELOMERE_REPEAT) >= self.min_repeats
            || Self::longest_run(sequence, TELOMERE_REPEAT_RC) >= self.min_repeats
    }
}

impl<F> ContentPredicate for F
where
    F: Fn(&[u8]) -> bool + Send + Sync,
{
    fn has_content(&self, sequence: &[u8]) -> bool {
        self(sequence)
    }
}
