//! Tests for the `telbam extract` command.

use std::process::Command;

use tempfile::TempDir;

use crate::helpers::{
    PLAIN, TELOMERIC, create_mate, create_test_header, read_bam_records, read_data_rows,
    records_per_name, write_bam,
};

#[test]
fn test_extract_basic() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input_bam = temp_dir.path().join("input.bam");
    let output_bam = temp_dir.path().join("output.bam");
    let read_data = temp_dir.path().join("reads.tsv.gz");

    write_bam(
        &input_bam,
        &create_test_header(),
        &[
            create_mate("telo", true, TELOMERIC),
            create_mate("plain", true, PLAIN),
            create_mate("plain", false, PLAIN),
            create_mate("telo", false, PLAIN),
        ],
    );

    let status = Command::new(env!("CARGO_BIN_EXE_telbam"))
        .args([
            "extract",
            "-i",
            input_bam.to_str().unwrap(),
            "-o",
            output_bam.to_str().unwrap(),
            "--read-data",
            read_data.to_str().unwrap(),
        ])
        .status()
        .expect("Failed to run extract command");

    assert!(status.success(), "Extract command failed");
    assert!(output_bam.exists(), "Output BAM not created");

    let counts = records_per_name(&output_bam);
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get("telo"), Some(&2));

    let rows = read_data_rows(&read_data);
    assert_eq!(rows.len(), 2);
    let r1 = rows.iter().find(|row| row.first_in_pair).expect("R1 row missing");
    assert_eq!(r1.read_id, "telo");
    assert_eq!(r1.chromosome, "chr1");
    assert_eq!(r1.pos_start, 100);
    assert_eq!(r1.pos_end, 123);
    assert_eq!(r1.mate_chr, "chr1");
    assert_eq!(r1.mate_pos_start, 400);
    assert_eq!(r1.cigar, "24M");
    assert_eq!(r1.insert_size, 324);
    assert!(r1.has_telo_content);
    assert!(r1.complete_frag);
    assert!(!r1.is_supplementary);
    assert_eq!(r1.supp_data, "");
    let r2 = rows.iter().find(|row| !row.first_in_pair).expect("R2 row missing");
    assert!(!r2.has_telo_content);
    assert_eq!(r2.insert_size, -324);
}

#[test]
fn test_extract_min_repeats_threshold() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input_bam = temp_dir.path().join("input.bam");
    let output_bam = temp_dir.path().join("output.bam");

    write_bam(
        &input_bam,
        &create_test_header(),
        &[create_mate("telo", true, TELOMERIC), create_mate("telo", false, PLAIN)],
    );

    let status = Command::new(env!("CARGO_BIN_EXE_telbam"))
        .args([
            "extract",
            "-i",
            input_bam.to_str().unwrap(),
            "-o",
            output_bam.to_str().unwrap(),
            "--min-telomere-repeats",
            "5",
            "--threads",
            "2",
        ])
        .status()
        .expect("Failed to run extract command");

    assert!(status.success(), "Extract command failed");
    assert!(read_bam_records(&output_bam).is_empty());
}

#[test]
fn test_extract_no_mate_recovery() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input_bam = temp_dir.path().join("input.bam");
    let output_bam = temp_dir.path().join("output.bam");

    write_bam(
        &input_bam,
        &create_test_header(),
        &[create_mate("telo", false, PLAIN), create_mate("telo", true, TELOMERIC)],
    );

    let status = Command::new(env!("CARGO_BIN_EXE_telbam"))
        .args([
            "extract",
            "-i",
            input_bam.to_str().unwrap(),
            "-o",
            output_bam.to_str().unwrap(),
            "--no-mate-recovery",
        ])
        .status()
        .expect("Failed to run extract command");

    assert!(status.success(), "Extract command failed");
    assert_eq!(records_per_name(&output_bam).get("telo"), Some(&1));
}

#[test]
fn test_extract_missing_input_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_bam = temp_dir.path().join("output.bam");

    let output = Command::new(env!("CARGO_BIN_EXE_telbam"))
        .args([
            "extract",
            "-i",
            temp_dir.path().join("missing.bam").to_str().unwrap(),
            "-o",
            output_bam.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run extract command");

    assert!(!output.status.success());
    assert!(!output_bam.exists());
}

#[test]
fn test_extract_rejects_uncompressed_read_data() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input_bam = temp_dir.path().join("input.bam");
    write_bam(&input_bam, &create_test_header(), &[]);

    let output = Command::new(env!("CARGO_BIN_EXE_telbam"))
        .args([
            "extract",
            "-i",
            input_bam.to_str().unwrap(),
            "-o",
            temp_dir.path().join("output.bam").to_str().unwrap(),
            "--read-data",
            temp_dir.path().join("reads.tsv").to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run extract command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("read-data"), "unexpected stderr: {stderr}");
}
