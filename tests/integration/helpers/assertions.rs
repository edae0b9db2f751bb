//! Readers and assertions over extraction outputs.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use fgoxide::io::DelimFile;
use noodles::sam::alignment::record_buf::RecordBuf;
use telbam_lib::bam_io::create_bam_reader;
use telbam_lib::output::ReadDataRow;
use telbam_lib::sam::read_name;

/// Reads every record of a BAM.
///
/// # Panics
///
/// Panics if the BAM cannot be read.
#[must_use]
pub fn read_bam_records(path: &Path) -> Vec<RecordBuf> {
    let (mut reader, header) = create_bam_reader(path, 1).expect("Failed to open BAM");
    reader.record_bufs(&header).map(|r| r.expect("Failed to read record")).collect()
}

/// Counts output records per read name.
#[must_use]
pub fn records_per_name(path: &Path) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in read_bam_records(path) {
        let name = read_name(&record).expect("Output record without a name");
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

/// Reads the gzip read data table.
///
/// # Panics
///
/// Panics if the table cannot be read.
#[must_use]
pub fn read_data_rows(path: &Path) -> Vec<ReadDataRow> {
    DelimFile::default().read_tsv(&path).expect("Failed to read read data table")
}

/// Asserts that records sharing a name are written next to each other.
///
/// # Panics
///
/// Panics if a name reappears after a different name was written.
pub fn assert_groups_contiguous(records: &[RecordBuf]) {
    let mut finished: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    for record in records {
        let name = read_name(record).expect("Output record without a name");
        if current.as_deref() != Some(name.as_str()) {
            assert!(!finished.contains(&name), "Group {name} was split in the output");
            if let Some(previous) = current.take() {
                finished.push(previous);
            }
            current = Some(name);
        }
    }
}
