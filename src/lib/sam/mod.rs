//! SAM/BAM record utilities.
//!
//! - [`record_utils`] - field accessors used by read grouping and the read data table
//!   (read names, segments, `SA` tag handling, CIGAR and reference formatting)
//! - [`builder`] - a fluent builder for constructing records and headers in tests

pub mod builder;
pub mod record_utils;

pub use builder::{RecordBuilder, create_header, parse_cigar};
pub use record_utils::{
    Segment, cigar_to_string, position_or_zero, read_name, reference_name,
    supplementary_alignment_count, supplementary_data,
};

use noodles::sam::alignment::record::data::field::Tag;

/// The `SA` tag listing a read's other (chimeric) alignments.
pub const SA_TAG: Tag = Tag::new(b'S', b'A');
