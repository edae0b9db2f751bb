//! Extract telomeric read groups from an aligned BAM.
//!
//! This module implements the `extract` command. Reads whose bases carry telomeric repeats
//! open a read group; every other record with the same name (the mate and any supplementary
//! alignments) joins it. Groups are written to the output BAM as soon as they are complete,
//! and whatever is still open at the end of the input is written with a warning.

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use telbam_lib::logging::OperationTimer;
use telbam_lib::pipeline::{DEFAULT_QUEUE_CAPACITY, ExtractConfig, run_extract};
use telbam_lib::telomere::DEFAULT_MIN_REPEATS;

use crate::commands::command::Command;
use crate::commands::common::{BamIoOptions, ThreadingOptions};

/// Extract telomeric read groups.
#[derive(Debug, Parser)]
#[command(
    name = "extract",
    about = "\x1b[38;5;72m[EXTRACTION]\x1b[0m     \x1b[36mExtract telomeric read groups from a BAM\x1b[0m",
    long_about = r#"
Extract telomeric read groups from an aligned BAM.

Every read whose bases contain at least --min-telomere-repeats consecutive copies of TTAGGG
(or CCCTAA) opens a read group. All other alignment records with the same read name, such as
the mate and supplementary alignments, are added to the group. A group is written to the output
BAM as soon as it is complete:

  - both mates' primary alignments are present (or the single primary of an unpaired read), and
  - every supplementary alignment listed in a primary's SA tag is present.

After the first pass the input is scanned again for mates of groups that are still incomplete,
unless --no-mate-recovery is given. Groups that never complete are written at the end and
reported in the log.

With --read-data, one row per written record is saved to a gzip-compressed TSV.

Example usage:
  telbam extract -i aligned.bam -o telomeric.bam
  telbam extract -i aligned.bam -o telomeric.bam --read-data reads.tsv.gz --threads 4
"#
)]
pub struct Extract {
    /// Input/output BAM options
    #[command(flatten)]
    pub io: BamIoOptions,

    /// Optional gzip-compressed TSV with one row per written record (must end in .gz)
    #[arg(long = "read-data")]
    pub read_data: Option<PathBuf>,

    /// Threading options
    #[command(flatten)]
    pub threading: ThreadingOptions,

    /// Maximum number of records waiting between the reader and the writer
    #[arg(long = "queue-capacity", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Consecutive telomeric repeats required for a read to open a group
    #[arg(long = "min-telomere-repeats", default_value_t = DEFAULT_MIN_REPEATS)]
    pub min_telomere_repeats: usize,

    /// Skip the second pass that looks for mates of incomplete groups
    #[arg(long = "no-mate-recovery", default_value = "false")]
    pub no_mate_recovery: bool,
}

impl Extract {
    fn config(&self) -> ExtractConfig {
        ExtractConfig {
            input: self.io.input.clone(),
            output: self.io.output.clone(),
            read_data: self.read_data.clone(),
            threads: self.threading.threads,
            queue_capacity: self.queue_capacity,
            min_telomere_repeats: self.min_telomere_repeats,
            mate_recovery: !self.no_mate_recovery,
        }
    }
}

impl Command for Extract {
    fn execute(&self, command_line: &str) -> Result<()> {
        let config = self.config();
        config.validate()?;

        info!("Command: {command_line}");
        info!("Minimum telomeric repeats: {}", config.min_telomere_repeats);
        info!("Threads: {}", config.threads);
        info!("Mate recovery: {}", if config.mate_recovery { "enabled" } else { "disabled" });

        let timer = OperationTimer::new("Extracting telomeric read groups");
        let summary = run_extract(&config)?;
        timer.log_completion(summary.accepted_reads);
        Ok(())
    }
}
