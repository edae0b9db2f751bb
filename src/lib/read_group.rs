//! Read groups: every alignment record sharing one read name.
//!
//! A [`ReadGroup`] collects the primary records of both mates together with their
//! supplementary alignments and decides when everything the records declare has arrived.
//! Nothing in this module logs; the consumer renders a [`Completeness`] report when it needs
//! to explain why a group never resolved.

use std::fmt;

use noodles::sam::alignment::RecordBuf;

use crate::errors::{Result, TelbamError};
use crate::sam::{Segment, supplementary_alignment_count, supplementary_data};

/// What one segment of a group has and what it is still waiting for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentCompleteness {
    /// Whether the primary record for the segment is present
    pub has_primary: bool,
    /// Supplementary alignments declared by the primary's `SA` tag
    pub expected_supplementary: usize,
    /// Supplementary records present for the segment
    pub supplementary: usize,
}

impl SegmentCompleteness {
    fn supplementary_satisfied(&self) -> bool {
        self.supplementary >= self.expected_supplementary
            && (self.supplementary == 0 || self.has_primary)
    }
}

/// Completeness evaluation of a [`ReadGroup`].
///
/// A group is complete when:
///
/// 1. a primary record is present;
/// 2. both the R1 and R2 primaries are present if any record is paired;
/// 3. each primary with an `SA` tag has at least as many supplementary records as the tag lists;
/// 4. every supplementary record's segment has its primary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Completeness {
    /// Whether any record in the group is flagged as paired
    pub paired: bool,
    /// State of the first (or only) segment
    pub r1: SegmentCompleteness,
    /// State of the second segment
    pub r2: SegmentCompleteness,
}

impl Completeness {
    /// Evaluates the completeness rules.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let primaries = if self.paired {
            self.r1.has_primary && self.r2.has_primary
        } else {
            self.r1.has_primary
        };
        primaries && self.r1.supplementary_satisfied() && self.r2.supplementary_satisfied()
    }

    fn segment_mut(&mut self, segment: Segment) -> &mut SegmentCompleteness {
        match segment {
            Segment::R1 => &mut self.r1,
            Segment::R2 => &mut self.r2,
        }
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        write!(
            f,
            "complete={} paired={} r1Primary={} r1Supp={}/{} r2Primary={} r2Supp={}/{}",
            self.is_complete(),
            self.paired,
            yes_no(self.r1.has_primary),
            self.r1.supplementary,
            self.r1.expected_supplementary,
            yes_no(self.r2.has_primary),
            self.r2.supplementary,
            self.r2.expected_supplementary,
        )
    }
}

/// All records for one read name.
///
/// Records are kept in two append-only collections: `reads` holds at most one primary record
/// per segment and `supplementary_reads` holds supplementary alignments. Membership uses value
/// equality, so the same record fed twice is stored once.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadGroup {
    name: String,
    reads: Vec<RecordBuf>,
    supplementary_reads: Vec<RecordBuf>,
}

impl ReadGroup {
    /// Creates an empty group for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), reads: Vec::new(), supplementary_reads: Vec::new() }
    }

    /// The read name shared by every record in the group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary records in insertion order.
    #[must_use]
    pub fn reads(&self) -> &[RecordBuf] {
        &self.reads
    }

    /// Supplementary records in insertion order.
    #[must_use]
    pub fn supplementary_reads(&self) -> &[RecordBuf] {
        &self.supplementary_reads
    }

    /// Primary records followed by supplementary records.
    pub fn all_reads(&self) -> impl Iterator<Item = &RecordBuf> {
        self.reads.iter().chain(self.supplementary_reads.iter())
    }

    /// Total number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reads.len() + self.supplementary_reads.len()
    }

    /// Returns `true` if no record has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if an equal record is already stored.
    #[must_use]
    pub fn contains(&self, record: &RecordBuf) -> bool {
        self.collection_for(record).contains(record)
    }

    /// The primary record stored for `segment`, if any.
    #[must_use]
    pub fn primary(&self, segment: Segment) -> Option<&RecordBuf> {
        self.reads.iter().find(|r| Segment::of(r) == segment)
    }

    /// Adds a record to the group.
    ///
    /// Supplementary records go to `supplementary_reads`, everything else to `reads`. Returns
    /// `false` and leaves the group unchanged if the record is already present, carries a
    /// different name, is a secondary alignment, or is a second primary for a segment that
    /// already has one.
    pub fn accept_read(&mut self, record: RecordBuf) -> bool {
        if self.contains(&record) || !self.is_named(&record) {
            return false;
        }

        let flags = record.flags();
        if flags.is_secondary() {
            return false;
        }

        if flags.is_supplementary() {
            self.supplementary_reads.push(record);
        } else {
            if self.primary(Segment::of(&record)).is_some() {
                return false;
            }
            self.reads.push(record);
        }
        true
    }

    /// Evaluates the group against the completeness rules.
    #[must_use]
    pub fn completeness(&self) -> Completeness {
        let mut report = Completeness {
            paired: self.all_reads().any(|r| r.flags().is_segmented()),
            ..Completeness::default()
        };

        for record in &self.reads {
            let segment = report.segment_mut(Segment::of(record));
            segment.has_primary = true;
            segment.expected_supplementary =
                supplementary_data(record).map_or(0, |sa| supplementary_alignment_count(&sa));
        }
        for record in &self.supplementary_reads {
            report.segment_mut(Segment::of(record)).supplementary += 1;
        }

        report
    }

    /// Returns `true` if every record the group's metadata declares is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completeness().is_complete()
    }

    /// Verifies the structural invariants of the group.
    ///
    /// # Errors
    ///
    /// Returns [`TelbamError::InvariantViolation`] if a record is stored twice, a record has a
    /// different name, a supplementary record sits among the primaries (or the reverse), or a
    /// segment has more than one primary.
    pub fn check_invariant(&self) -> Result<()> {
        let violation = |reason: String| TelbamError::InvariantViolation {
            read_name: self.name.clone(),
            reason,
        };

        let all: Vec<&RecordBuf> = self.all_reads().collect();
        for (i, record) in all.iter().enumerate() {
            if !self.is_named(record) {
                return Err(violation(format!(
                    "record {i} is named {:?}",
                    record.name().map(ToString::to_string)
                )));
            }
            if all[i + 1..].contains(record) {
                return Err(violation(format!("record {i} is stored more than once")));
            }
        }

        if self.reads.iter().any(|r| r.flags().is_supplementary()) {
            return Err(violation("supplementary record stored as primary".to_string()));
        }
        if self.supplementary_reads.iter().any(|r| !r.flags().is_supplementary()) {
            return Err(violation("primary record stored as supplementary".to_string()));
        }
        for segment in [Segment::R1, Segment::R2] {
            if self.reads.iter().filter(|r| Segment::of(r) == segment).count() > 1 {
                return Err(violation(format!("more than one primary record for {segment:?}")));
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, record: RecordBuf) {
        self.reads.push(record);
    }

    fn is_named(&self, record: &RecordBuf) -> bool {
        record.name().is_some_and(|n| <_ as AsRef<[u8]>>::as_ref(n) == self.name.as_bytes())
    }

    fn collection_for(&self, record: &RecordBuf) -> &[RecordBuf] {
        if record.flags().is_supplementary() { &self.supplementary_reads } else { &self.reads }
    }
}
