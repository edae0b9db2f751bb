//! Utilities for generating test BAM data programmatically.

#![allow(dead_code)]

use std::path::Path;

use noodles::sam::Header;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::record_buf::RecordBuf;
use telbam_lib::bam_io::create_bam_writer;
use telbam_lib::sam::builder::{RecordBuilder, create_header};

/// Four copies of the telomeric repeat, enough to open a group at the default threshold.
pub const TELOMERIC: &str = "TTAGGGTTAGGGTTAGGGTTAGGG";

/// The reverse-complement repeat, as seen on reads from the C-rich strand.
pub const TELOMERIC_RC: &str = "CCCTAACCCTAACCCTAACCCTAA";

/// A sequence with no telomeric content.
pub const PLAIN: &str = "ACGTTGCAACGTTGCAACGTTGCA";

/// Two references, long enough for every position used below.
#[must_use]
pub fn create_test_header() -> Header {
    create_header(&[("chr1", 100_000), ("chr2", 100_000)])
}

/// Creates a mapped mate on `chr1` with the given sequence.
///
/// R1 is placed at 100 and R2 at 400, each pointing at the other.
#[must_use]
pub fn create_mate(name: &str, first: bool, sequence: &str) -> RecordBuf {
    let (pos, mate_pos) = if first { (100, 400) } else { (400, 100) };
    RecordBuilder::mapped_read()
        .name(name)
        .first_segment(first)
        .sequence(sequence)
        .alignment_start(pos)
        .reverse_complement(!first)
        .mate_reference_sequence_id(0)
        .mate_alignment_start(mate_pos)
        .template_length(if first { 324 } else { -324 })
        .build()
}

/// Creates a primary R1 that declares one supplementary alignment on `chr2`.
#[must_use]
pub fn create_split_primary(name: &str) -> RecordBuf {
    RecordBuilder::mapped_read()
        .name(name)
        .first_segment(true)
        .sequence(TELOMERIC)
        .cigar("12M12S")
        .alignment_start(100)
        .mate_reference_sequence_id(0)
        .mate_alignment_start(400)
        .tag("SA", "chr2,5000,+,12S12M,60,0;")
        .build()
}

/// Creates the supplementary alignment declared by [`create_split_primary`].
#[must_use]
pub fn create_split_supplementary(name: &str) -> RecordBuf {
    RecordBuilder::mapped_read()
        .name(name)
        .first_segment(true)
        .supplementary(true)
        .reference_sequence_id(1)
        .sequence(TELOMERIC)
        .cigar("12S12M")
        .alignment_start(5000)
        .mate_reference_sequence_id(0)
        .mate_alignment_start(400)
        .tag("SA", "chr1,100,+,12M12S,60,0;")
        .build()
}

/// Creates an unpaired read.
#[must_use]
pub fn create_fragment(name: &str, sequence: &str) -> RecordBuf {
    RecordBuilder::mapped_read().name(name).sequence(sequence).alignment_start(2000).build()
}

/// Writes `records` to a BAM at `path` in the given order.
///
/// # Panics
///
/// Panics if the BAM cannot be written.
pub fn write_bam(path: &Path, header: &Header, records: &[RecordBuf]) {
    let mut writer = create_bam_writer(path, header, 1).expect("Failed to create BAM writer");
    for record in records {
        writer.write_alignment_record(header, record).expect("Failed to write record");
    }
    writer.into_inner().finish().expect("Failed to finish BAM");
}
