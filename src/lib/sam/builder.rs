//! Builder for creating test SAM/BAM records and headers.
//!
//! [`RecordBuilder`] creates individual records with a fluent API; [`create_header`] creates a
//! header with the given reference sequences.
//!
//! ```rust
//! use telbam_lib::sam::builder::RecordBuilder;
//!
//! let r1 = RecordBuilder::mapped_read()
//!     .name("read1")
//!     .first_segment(true)
//!     .sequence("TTAGGGTTAGGGTTAGGGTTAGGG")
//!     .alignment_start(100)
//!     .build();
//! assert!(r1.flags().is_first_segment());
//! ```

use bstr::BString;
use noodles::core::Position;
use noodles::sam::Header;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record::{Flags, MappingQuality};
use noodles::sam::alignment::record_buf::data::field::Value as BufValue;
use noodles::sam::alignment::record_buf::{QualityScores, RecordBuf, Sequence};
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::ReferenceSequence;
use std::num::NonZeroUsize;

/// Default base quality for generated qualities.
pub const DEFAULT_BASE_QUALITY: u8 = 30;

/// Builder for a single [`RecordBuf`].
#[derive(Debug, Default)]
pub struct RecordBuilder {
    name: Option<Vec<u8>>,
    flags: Flags,
    reference_sequence_id: Option<usize>,
    alignment_start: Option<usize>,
    mapping_quality: Option<u8>,
    cigar: Option<String>,
    sequence: Vec<u8>,
    qualities: Vec<u8>,
    tags: Vec<(Tag, BufValue)>,
    mate_reference_sequence_id: Option<usize>,
    mate_alignment_start: Option<usize>,
    template_length: Option<i32>,
}

impl RecordBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self { mapping_quality: Some(60), ..Self::default() }
    }

    /// Creates a builder for a read mapped to reference sequence 0.
    #[must_use]
    pub fn mapped_read() -> Self {
        Self { reference_sequence_id: Some(0), ..Self::new() }
    }

    /// Sets the read name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.as_bytes().to_vec());
        self
    }

    /// Sets the sequence; qualities default to [`DEFAULT_BASE_QUALITY`].
    #[must_use]
    pub fn sequence(mut self, seq: &str) -> Self {
        self.sequence = seq.as_bytes().to_vec();
        if self.qualities.is_empty() {
            self.qualities = vec![DEFAULT_BASE_QUALITY; seq.len()];
        }
        self
    }

    /// Sets all flags at once.
    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the first segment (R1) flag. Implies paired.
    #[must_use]
    pub fn first_segment(mut self, is_first: bool) -> Self {
        self.flags.set(Flags::SEGMENTED, true);
        self.flags.set(Flags::FIRST_SEGMENT, is_first);
        self.flags.set(Flags::LAST_SEGMENT, !is_first);
        self
    }

    /// Sets the unmapped flag.
    #[must_use]
    pub fn unmapped(mut self, unmapped: bool) -> Self {
        self.flags.set(Flags::UNMAPPED, unmapped);
        self
    }

    /// Sets the mate unmapped flag.
    #[must_use]
    pub fn mate_unmapped(mut self, unmapped: bool) -> Self {
        self.flags.set(Flags::MATE_UNMAPPED, unmapped);
        self
    }

    /// Sets the reverse complement flag.
    #[must_use]
    pub fn reverse_complement(mut self, reverse: bool) -> Self {
        self.flags.set(Flags::REVERSE_COMPLEMENTED, reverse);
        self
    }

    /// Sets the secondary alignment flag.
    #[must_use]
    pub fn secondary(mut self, secondary: bool) -> Self {
        self.flags.set(Flags::SECONDARY, secondary);
        self
    }

    /// Sets the supplementary alignment flag.
    #[must_use]
    pub fn supplementary(mut self, supplementary: bool) -> Self {
        self.flags.set(Flags::SUPPLEMENTARY, supplementary);
        self
    }

    /// Sets the reference sequence ID (0-based).
    #[must_use]
    pub fn reference_sequence_id(mut self, id: usize) -> Self {
        self.reference_sequence_id = Some(id);
        self
    }

    /// Sets the alignment start position (1-based).
    #[must_use]
    pub fn alignment_start(mut self, pos: usize) -> Self {
        self.alignment_start = Some(pos);
        self
    }

    /// Sets the CIGAR string.
    #[must_use]
    pub fn cigar(mut self, cigar: &str) -> Self {
        self.cigar = Some(cigar.to_string());
        self
    }

    /// Sets the mate reference sequence ID (0-based).
    #[must_use]
    pub fn mate_reference_sequence_id(mut self, id: usize) -> Self {
        self.mate_reference_sequence_id = Some(id);
        self
    }

    /// Sets the mate alignment start position (1-based).
    #[must_use]
    pub fn mate_alignment_start(mut self, pos: usize) -> Self {
        self.mate_alignment_start = Some(pos);
        self
    }

    /// Sets the template length (insert size).
    #[must_use]
    pub fn template_length(mut self, tlen: i32) -> Self {
        self.template_length = Some(tlen);
        self
    }

    /// Adds a SAM tag. Tags that are not exactly two characters are ignored.
    #[must_use]
    pub fn tag<V: Into<BufValue>>(mut self, tag: &str, value: V) -> Self {
        if let [a, b] = tag.as_bytes() {
            self.tags.push((Tag::from([*a, *b]), value.into()));
        }
        self
    }

    /// Builds the `RecordBuf`.
    ///
    /// If only a sequence is given the CIGAR becomes `{len}M`; if only a CIGAR is given a
    /// sequence of matching length is generated.
    ///
    /// # Panics
    ///
    /// Panics on positions of zero or an invalid CIGAR string.
    #[must_use]
    pub fn build(self) -> RecordBuf {
        let mut record = RecordBuf::default();

        if let Some(name) = self.name {
            *record.name_mut() = Some(name.into());
        }
        *record.flags_mut() = self.flags;
        *record.reference_sequence_id_mut() = self.reference_sequence_id;
        *record.alignment_start_mut() = self
            .alignment_start
            .map(|pos| Position::try_from(pos).expect("alignment_start must be >= 1"));
        *record.mate_reference_sequence_id_mut() = self.mate_reference_sequence_id;
        *record.mate_alignment_start_mut() = self
            .mate_alignment_start
            .map(|pos| Position::try_from(pos).expect("mate_alignment_start must be >= 1"));
        if let Some(tlen) = self.template_length {
            *record.template_length_mut() = tlen;
        }
        *record.mapping_quality_mut() = self.mapping_quality.and_then(MappingQuality::new);

        let (cigar_str, sequence) = match (self.cigar, self.sequence.is_empty()) {
            (Some(cigar), true) => {
                let generated: Vec<u8> =
                    b"ACGT".iter().copied().cycle().take(cigar_seq_len(&cigar)).collect();
                (cigar, generated)
            }
            (Some(cigar), false) => (cigar, self.sequence),
            (None, false) => (format!("{}M", self.sequence.len()), self.sequence),
            (None, true) => (String::new(), Vec::new()),
        };

        if !cigar_str.is_empty() {
            *record.cigar_mut() = parse_cigar(&cigar_str).into_iter().collect();
        }

        let qualities = if self.qualities.len() == sequence.len() {
            self.qualities
        } else {
            vec![DEFAULT_BASE_QUALITY; sequence.len()]
        };
        *record.sequence_mut() = Sequence::from(sequence);
        *record.quality_scores_mut() = QualityScores::from(qualities);

        for (tag, value) in self.tags {
            record.data_mut().insert(tag, value);
        }

        record
    }
}

/// Parses a CIGAR string into operations.
///
/// # Panics
///
/// Panics if the CIGAR string contains invalid characters or formatting.
#[must_use]
pub fn parse_cigar(cigar_str: &str) -> Vec<Op> {
    let mut ops = Vec::new();
    let mut num_str = String::new();

    for c in cigar_str.chars() {
        if c.is_ascii_digit() {
            num_str.push(c);
        } else {
            let len: usize = num_str.parse().expect("Invalid CIGAR: expected number");
            let kind = match c {
                'M' => Kind::Match,
                'I' => Kind::Insertion,
                'D' => Kind::Deletion,
                'N' => Kind::Skip,
                'S' => Kind::SoftClip,
                'H' => Kind::HardClip,
                'P' => Kind::Pad,
                '=' => Kind::SequenceMatch,
                'X' => Kind::SequenceMismatch,
                _ => panic!("Unknown CIGAR operation: {c}"),
            };
            ops.push(Op::new(kind, len));
            num_str.clear();
        }
    }

    ops
}

/// Number of read bases a CIGAR string consumes.
fn cigar_seq_len(cigar: &str) -> usize {
    parse_cigar(cigar)
        .iter()
        .filter(|op| {
            matches!(
                op.kind(),
                Kind::Match
                    | Kind::Insertion
                    | Kind::SoftClip
                    | Kind::SequenceMatch
                    | Kind::SequenceMismatch
            )
        })
        .map(|op| op.len())
        .sum()
}

/// Creates a SAM header with the given `(name, length)` reference sequences.
///
/// # Panics
///
/// Panics if any length is zero.
#[must_use]
pub fn create_header(references: &[(&str, usize)]) -> Header {
    references
        .iter()
        .fold(Header::builder(), |builder, (name, len)| {
            let map = Map::<ReferenceSequence>::new(
                NonZeroUsize::new(*len).expect("reference length must be non-zero"),
            );
            builder.add_reference_sequence(BString::from(*name), map)
        })
        .build()
}
