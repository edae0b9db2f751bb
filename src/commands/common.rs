//! Common CLI options shared across commands.
//!
//! This module provides shared argument structures that can be composed into
//! command structs using `#[command(flatten)]`.

use std::path::PathBuf;

use clap::Args;

/// Common input/output options for commands that read a BAM and write a BAM.
#[derive(Debug, Clone, Args)]
pub struct BamIoOptions {
    /// Input BAM file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output BAM file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

/// Threading options for BGZF compression and decompression.
///
/// # Examples
///
/// ```bash
/// telbam extract --threads 4 ...
/// # Uses 4 BGZF workers each for reading and writing
/// ```
#[derive(Debug, Clone, Args)]
pub struct ThreadingOptions {
    /// Number of BGZF worker threads for reading and writing (1 = single-threaded).
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    pub threads: usize,
}
