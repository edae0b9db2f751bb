//! Record-level utilities for SAM/BAM records.
//!
//! Accessors that turn the raw fields of a [`RecordBuf`] into the values read grouping and the
//! read data table work with.

use noodles::core::Position;
use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record_buf::Cigar;
use noodles::sam::alignment::record_buf::data::field::Value;
use std::fmt::Write as _;

use super::SA_TAG;

/// Which read of a template a record belongs to.
///
/// Unpaired records are treated as [`Segment::R1`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// First segment, or the only segment of an unpaired read
    R1,
    /// Second segment of a pair
    R2,
}

impl Segment {
    /// Returns the segment a record belongs to based on its flags.
    #[must_use]
    pub fn of(record: &RecordBuf) -> Self {
        let flags = record.flags();
        if !flags.is_segmented() || flags.is_first_segment() { Segment::R1 } else { Segment::R2 }
    }
}

/// Returns the read name as a string, or `None` for unnamed records.
#[must_use]
pub fn read_name(record: &RecordBuf) -> Option<String> {
    record.name().map(ToString::to_string)
}

/// Returns the `SA` tag value if present and a string.
#[must_use]
pub fn supplementary_data(record: &RecordBuf) -> Option<String> {
    match record.data().get(&SA_TAG) {
        Some(Value::String(s)) => Some(s.to_string()),
        _ => None,
    }
}

/// Counts the alignments declared by an `SA` tag value.
///
/// The value is a `;`-terminated list of `rname,pos,strand,CIGAR,mapQ,NM` entries; empty
/// entries are ignored.
///
/// # Examples
///
/// ```
/// use telbam_lib::sam::supplementary_alignment_count;
///
/// assert_eq!(supplementary_alignment_count("chr1,100,+,50M50S,60,0;"), 1);
/// assert_eq!(supplementary_alignment_count("chr1,100,+,50M50S,60,0;chr2,5,-,50S50M,60,1;"), 2);
/// assert_eq!(supplementary_alignment_count(""), 0);
/// ```
#[must_use]
pub fn supplementary_alignment_count(sa: &str) -> usize {
    sa.split(';').filter(|entry| !entry.trim().is_empty()).count()
}

fn kind_to_char(kind: Kind) -> char {
    match kind {
        Kind::Match => 'M',
        Kind::Insertion => 'I',
        Kind::Deletion => 'D',
        Kind::Skip => 'N',
        Kind::SoftClip => 'S',
        Kind::HardClip => 'H',
        Kind::Pad => 'P',
        Kind::SequenceMatch => '=',
        Kind::SequenceMismatch => 'X',
    }
}

/// Converts a CIGAR to its string representation, or `*` if empty.
#[must_use]
pub fn cigar_to_string(cigar: &Cigar) -> String {
    let ops = cigar.as_ref();
    if ops.is_empty() {
        return String::from("*");
    }

    let mut result = String::with_capacity(ops.len() * 4);
    for op in ops {
        let _ = write!(result, "{}{}", op.len(), kind_to_char(op.kind()));
    }
    result
}

/// Resolves a reference sequence id against the header, or `*` if unset or unknown.
#[must_use]
pub fn reference_name(header: &Header, id: Option<usize>) -> String {
    id.and_then(|i| header.reference_sequences().get_index(i))
        .map_or_else(|| String::from("*"), |(name, _)| name.to_string())
}

/// Returns a 1-based position as a number, or 0 if unset.
#[must_use]
pub fn position_or_zero(position: Option<Position>) -> usize {
    position.map_or(0, usize::from)
}
