//! End-to-end extraction through the library entry point.

use std::path::PathBuf;
use std::sync::Arc;

use noodles::sam::alignment::record_buf::RecordBuf;
use tempfile::TempDir;

use telbam_lib::consumer::LoopExit;
use telbam_lib::pipeline::{ExtractConfig, run_extract, run_extract_with};
use telbam_lib::sam::read_name;

use crate::helpers::{
    PLAIN, TELOMERIC, TELOMERIC_RC, assert_groups_contiguous, create_fragment, create_mate,
    create_split_primary, create_split_supplementary, create_test_header, read_bam_records,
    read_data_rows, records_per_name, write_bam,
};

struct Run {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
    read_data: PathBuf,
}

fn setup(records: &[RecordBuf]) -> Run {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = dir.path().join("input.bam");
    let output = dir.path().join("output.bam");
    let read_data = dir.path().join("reads.tsv.gz");
    write_bam(&input, &create_test_header(), records);
    Run { _dir: dir, input, output, read_data }
}

impl Run {
    fn config(&self) -> ExtractConfig {
        ExtractConfig::new(&self.input, &self.output)
    }
}

#[test]
fn test_telomeric_pair_is_written_complete() {
    let run = setup(&[create_mate("A", true, TELOMERIC), create_mate("A", false, PLAIN)]);

    let summary = run_extract(&run.config()).unwrap();

    assert_eq!(summary.completed_groups, 1);
    assert_eq!(summary.incomplete_groups, 0);
    assert_eq!(summary.accepted_reads, 2);
    assert_eq!(summary.exit, LoopExit::Terminated);
    assert_eq!(records_per_name(&run.output).get("A"), Some(&2));
}

#[test]
fn test_non_telomeric_templates_are_skipped() {
    let run = setup(&[
        create_mate("X", true, PLAIN),
        create_mate("X", false, PLAIN),
        create_fragment("F", PLAIN),
    ]);

    let summary = run_extract(&run.config()).unwrap();

    assert_eq!(summary.total_groups(), 0);
    assert!(read_bam_records(&run.output).is_empty());
}

#[test]
fn test_reverse_complement_repeat_opens_a_group() {
    let run = setup(&[create_fragment("F", TELOMERIC_RC)]);

    let summary = run_extract(&run.config()).unwrap();

    assert_eq!(summary.completed_groups, 1);
    assert_eq!(records_per_name(&run.output).get("F"), Some(&1));
}

#[test]
fn test_missing_mate_is_written_incomplete() {
    let run = setup(&[create_mate("Y", true, TELOMERIC)]);

    let summary = run_extract(&run.config().with_read_data(&run.read_data)).unwrap();

    assert_eq!(summary.completed_groups, 0);
    assert_eq!(summary.incomplete_groups, 1);
    assert_eq!(records_per_name(&run.output).get("Y"), Some(&1));

    let rows = read_data_rows(&run.read_data);
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].complete_frag);
}

#[test]
fn test_mate_before_telomeric_read_is_recovered() {
    let run = setup(&[
        create_mate("T", false, PLAIN),
        create_fragment("other", PLAIN),
        create_mate("T", true, TELOMERIC),
    ]);

    let summary = run_extract(&run.config()).unwrap();

    assert_eq!(summary.completed_groups, 1);
    assert_eq!(summary.incomplete_groups, 0);
    assert_eq!(summary.accepted_reads, 2);
    assert_eq!(records_per_name(&run.output).get("T"), Some(&2));
    assert!(!records_per_name(&run.output).contains_key("other"));
}

#[test]
fn test_without_recovery_early_mate_is_lost() {
    let run = setup(&[create_mate("T", false, PLAIN), create_mate("T", true, TELOMERIC)]);
    let mut config = run.config();
    config.mate_recovery = false;

    let summary = run_extract(&config).unwrap();

    assert_eq!(summary.completed_groups, 0);
    assert_eq!(summary.incomplete_groups, 1);
    assert_eq!(records_per_name(&run.output).get("T"), Some(&1));
}

#[test]
fn test_group_waits_for_declared_supplementary() {
    let run = setup(&[
        create_split_primary("S"),
        create_mate("S", false, PLAIN),
        create_split_supplementary("S"),
    ]);

    let summary = run_extract(&run.config().with_read_data(&run.read_data)).unwrap();

    assert_eq!(summary.completed_groups, 1);
    assert_eq!(summary.accepted_reads, 3);
    assert_eq!(records_per_name(&run.output).get("S"), Some(&3));

    let rows = read_data_rows(&run.read_data);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.complete_frag));
    let supplementary: Vec<_> = rows.iter().filter(|row| row.is_supplementary).collect();
    assert_eq!(supplementary.len(), 1);
    assert_eq!(supplementary[0].chromosome, "chr2");
    assert_eq!(supplementary[0].pos_start, 5000);
    assert_eq!(supplementary[0].supp_data, "chr1,100,+,12M12S,60,0;");
}

#[test]
fn test_missing_supplementary_leaves_group_incomplete() {
    let run = setup(&[create_split_primary("S"), create_mate("S", false, PLAIN)]);

    let summary = run_extract(&run.config()).unwrap();

    assert_eq!(summary.completed_groups, 0);
    assert_eq!(summary.incomplete_groups, 1);
    assert_eq!(records_per_name(&run.output).get("S"), Some(&2));
}

#[test]
fn test_every_accepted_record_written_once_and_grouped() {
    let mut records = Vec::new();
    for i in 0..20 {
        let name = format!("read{i:02}");
        let r1 = if i % 3 == 0 { TELOMERIC } else { PLAIN };
        let r2 = if i % 5 == 0 { TELOMERIC_RC } else { PLAIN };
        records.push(create_mate(&name, true, r1));
        records.push(create_mate(&name, false, r2));
    }
    let run = setup(&records);
    let mut config = run.config();
    config.queue_capacity = 2;

    let summary = run_extract(&config).unwrap();

    let output = read_bam_records(&run.output);
    let expected: Vec<String> = (0..20)
        .filter(|i| i % 3 == 0 || i % 5 == 0)
        .map(|i| format!("read{i:02}"))
        .collect();
    assert_eq!(summary.completed_groups, expected.len() as u64);
    assert_eq!(summary.accepted_reads, output.len() as u64);
    assert_eq!(output.len(), expected.len() * 2);

    let counts = records_per_name(&run.output);
    for name in &expected {
        assert_eq!(counts.get(name), Some(&2), "{name}");
    }
    assert_groups_contiguous(&output);
}

#[test]
fn test_secondary_alignments_are_ignored() {
    let secondary = telbam_lib::sam::builder::RecordBuilder::mapped_read()
        .name("A")
        .first_segment(true)
        .secondary(true)
        .sequence(TELOMERIC)
        .alignment_start(9000)
        .build();
    let run = setup(&[
        create_mate("A", true, TELOMERIC),
        secondary,
        create_mate("A", false, PLAIN),
    ]);

    let summary = run_extract(&run.config()).unwrap();

    assert_eq!(summary.completed_groups, 1);
    let output = read_bam_records(&run.output);
    assert_eq!(output.len(), 2);
    assert!(output.iter().all(|r| !r.flags().is_secondary()));
}

#[test]
fn test_custom_predicate() {
    let run = setup(&[create_fragment("P", PLAIN), create_fragment("Q", TELOMERIC)]);
    let predicate = |bases: &[u8]| bases.starts_with(b"ACGT");

    let summary = run_extract_with(&run.config(), Arc::new(predicate)).unwrap();

    assert_eq!(summary.completed_groups, 1);
    let names: Vec<_> =
        read_bam_records(&run.output).iter().filter_map(read_name).collect();
    assert_eq!(names, vec!["P".to_string()]);
}

#[test]
fn test_multithreaded_io() {
    let run = setup(&[create_mate("A", true, TELOMERIC), create_mate("A", false, PLAIN)]);
    let mut config = run.config().with_read_data(&run.read_data);
    config.threads = 3;

    let summary = run_extract(&config).unwrap();

    assert_eq!(summary.completed_groups, 1);
    assert_eq!(read_bam_records(&run.output).len(), 2);
    assert_eq!(read_data_rows(&run.read_data).len(), 2);
}

#[test]
fn test_no_read_data_file_without_path() {
    let run = setup(&[create_mate("A", true, TELOMERIC), create_mate("A", false, PLAIN)]);

    run_extract(&run.config()).unwrap();

    assert!(run.output.exists());
    assert!(!run.read_data.exists());
}

#[test]
fn test_truncated_input_still_closes_outputs() {
    let mut records = Vec::new();
    for i in 0..1500 {
        let name = format!("read{i:04}");
        let r1 = if i % 2 == 0 { TELOMERIC } else { PLAIN };
        records.push(create_mate(&name, true, r1));
        records.push(create_mate(&name, false, PLAIN));
    }
    let run = setup(&records);
    let bytes = std::fs::read(&run.input).unwrap();
    std::fs::write(&run.input, &bytes[..bytes.len() * 2 / 3]).unwrap();

    let err = run_extract(&run.config().with_read_data(&run.read_data)).unwrap_err();

    assert!(format!("{err:#}").contains("Failed to read record from"), "{err:#}");
    let output = read_bam_records(&run.output);
    assert!(!output.is_empty());
    assert_groups_contiguous(&output);
    assert_eq!(read_data_rows(&run.read_data).len(), output.len());
}

#[test]
fn test_unreadable_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bam");
    std::fs::write(&input, b"not a bam").unwrap();

    let config = ExtractConfig::new(&input, dir.path().join("output.bam"));
    assert!(run_extract(&config).is_err());
}
