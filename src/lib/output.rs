//! Output channels for flushed read groups.
//!
//! [`OutputSink`] appends every record of a flushed group to the output BAM and, when a path
//! is configured, collects one [`ReadDataRow`] per record for the gzip TSV read data table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use fgoxide::io::DelimFile;
use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use serde::{Deserialize, Serialize};

use crate::bam_io::{BamWriter, create_bam_writer};
use crate::errors::TelbamError;
use crate::read_group::ReadGroup;
use crate::sam::{cigar_to_string, position_or_zero, reference_name, supplementary_data};
use crate::telomere::ContentPredicate;

/// One row of the read data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadDataRow {
    /// Read name
    pub read_id: String,
    /// Reference sequence name, or `*`
    pub chromosome: String,
    /// 1-based alignment start, or 0
    pub pos_start: usize,
    /// 1-based alignment end, or 0
    pub pos_end: usize,
    /// Mate reference sequence name, or `*`
    pub mate_chr: String,
    /// 1-based mate alignment start, or 0
    pub mate_pos_start: usize,
    /// Whether the read's bases have telomeric content
    pub has_telo_content: bool,
    /// CIGAR string, or `*`
    pub cigar: String,
    /// Template length
    pub insert_size: i32,
    pub first_in_pair: bool,
    pub unmapped: bool,
    pub mate_unmapped: bool,
    pub is_supplementary: bool,
    /// Raw SAM flags
    pub flags: u16,
    /// `SA` tag value, or empty
    pub supp_data: String,
    /// Whether the record's group was complete when the row was written
    pub complete_frag: bool,
}

impl ReadDataRow {
    /// Builds the row for `record`.
    #[must_use]
    pub fn from_record(
        header: &Header,
        record: &RecordBuf,
        has_telo_content: bool,
        complete_frag: bool,
    ) -> Self {
        let flags = record.flags();
        Self {
            read_id: crate::sam::read_name(record).unwrap_or_default(),
            chromosome: reference_name(header, record.reference_sequence_id()),
            pos_start: position_or_zero(record.alignment_start()),
            pos_end: if flags.is_unmapped() {
                0
            } else {
                position_or_zero(record.alignment_end())
            },
            mate_chr: reference_name(header, record.mate_reference_sequence_id()),
            mate_pos_start: position_or_zero(record.mate_alignment_start()),
            has_telo_content,
            cigar: cigar_to_string(record.cigar()),
            insert_size: record.template_length(),
            first_in_pair: flags.is_first_segment(),
            unmapped: flags.is_unmapped(),
            mate_unmapped: flags.is_mate_unmapped(),
            is_supplementary: flags.is_supplementary(),
            flags: u16::from(flags),
            supp_data: supplementary_data(record).unwrap_or_default(),
            complete_frag,
        }
    }
}

/// Rows of the read data table waiting to be written to `path`.
#[derive(Debug)]
pub struct ReadDataTable {
    path: PathBuf,
    rows: Vec<ReadDataRow>,
}

impl ReadDataTable {
    /// Creates an empty table destined for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), rows: Vec::new() }
    }

    /// Appends a row.
    pub fn push(&mut self, row: ReadDataRow) {
        self.rows.push(row);
    }

    /// Writes the table as TSV. A `.gz` path is gzip compressed.
    ///
    /// # Errors
    ///
    /// Returns [`TelbamError::ReadDataWrite`] naming the path and cause if writing fails.
    pub fn write(self) -> crate::errors::Result<()> {
        DelimFile::default().write_tsv(&self.path, &self.rows).map_err(|e| {
            TelbamError::ReadDataWrite {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        log::info!(
            "Wrote {} read data rows to {}",
            crate::logging::format_count(self.rows.len() as u64),
            self.path.display()
        );
        Ok(())
    }
}

/// The aligned-record stream and the optional read data table.
pub struct OutputSink {
    header: Header,
    writer: BamWriter,
    path: PathBuf,
    read_data: Option<ReadDataTable>,
    predicate: Arc<dyn ContentPredicate>,
    records_written: u64,
}

impl OutputSink {
    /// Opens the output BAM with `header` and prepares the read data table if `read_data` is
    /// set. No read data file is created until [`ReadDataTable::write`].
    ///
    /// # Errors
    ///
    /// Returns an error if the BAM cannot be created or its header cannot be written.
    pub fn create(
        output: &Path,
        header: Header,
        threads: usize,
        read_data: Option<&Path>,
        predicate: Arc<dyn ContentPredicate>,
    ) -> Result<Self> {
        let writer = create_bam_writer(output, &header, threads)?;
        Ok(Self {
            header,
            writer,
            path: output.to_path_buf(),
            read_data: read_data.map(ReadDataTable::new),
            predicate,
            records_written: 0,
        })
    }

    /// Appends every record of `group`, primaries first, and one table row per record.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be written to the BAM.
    pub fn write_group(&mut self, group: &ReadGroup, complete: bool) -> Result<()> {
        for record in group.all_reads() {
            self.writer.write_alignment_record(&self.header, record).with_context(|| {
                format!("Failed to write read {} to: {}", group.name(), self.path.display())
            })?;
            self.records_written += 1;

            if let Some(table) = self.read_data.as_mut() {
                let has_telo = self.predicate.has_content(record.sequence().as_ref());
                table.push(ReadDataRow::from_record(&self.header, record, has_telo, complete));
            }
        }
        Ok(())
    }

    /// Number of records appended to the BAM.
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Finishes the BAM and hands back the pending read data table, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the BAM cannot be flushed and closed.
    pub fn close(self) -> Result<Option<ReadDataTable>> {
        self.writer
            .into_inner()
            .finish()
            .with_context(|| format!("Failed to close output BAM: {}", self.path.display()))?;
        Ok(self.read_data)
    }
}
