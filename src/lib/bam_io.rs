//! BAM file I/O utilities.
//!
//! Helpers for creating BAM readers and writers with consistent error handling.
//!
//! # Threading Model
//!
//! BAM files use BGZF compression, which can be parallelized for both reading and writing:
//!
//! - **Single-threaded**: Use `threads=1` (lower overhead, good for small files)
//! - **Multi-threaded**: Use `threads>1` (higher throughput for large files)

use anyhow::{Context, Result};
use noodles::bgzf::io::{
    MultithreadedReader, MultithreadedWriter, Reader as BgzfReader, Writer as BgzfWriter,
};
use noodles::sam::Header;
use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::num::NonZero;
use std::path::Path;

/// Enum wrapping single-threaded and multi-threaded BGZF readers.
pub enum BgzfReaderEnum {
    /// Single-threaded BGZF reader
    SingleThreaded(BgzfReader<File>),
    /// Multi-threaded BGZF reader
    MultiThreaded(MultithreadedReader<File>),
}

impl Read for BgzfReaderEnum {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            BgzfReaderEnum::SingleThreaded(r) => r.read(buf),
            BgzfReaderEnum::MultiThreaded(r) => r.read(buf),
        }
    }
}

impl BufRead for BgzfReaderEnum {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            BgzfReaderEnum::SingleThreaded(r) => r.fill_buf(),
            BgzfReaderEnum::MultiThreaded(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            BgzfReaderEnum::SingleThreaded(r) => r.consume(amt),
            BgzfReaderEnum::MultiThreaded(r) => r.consume(amt),
        }
    }
}

/// A BAM reader over either BGZF reader flavour.
pub type BamReader = noodles::bam::io::Reader<BgzfReaderEnum>;

/// Enum wrapping single-threaded and multi-threaded BGZF writers
pub enum BgzfWriterEnum {
    /// Single-threaded BGZF writer
    SingleThreaded(BgzfWriter<File>),
    /// Multi-threaded BGZF writer
    MultiThreaded(MultithreadedWriter<File>),
}

impl Write for BgzfWriterEnum {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            BgzfWriterEnum::SingleThreaded(w) => w.write(buf),
            BgzfWriterEnum::MultiThreaded(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            BgzfWriterEnum::SingleThreaded(w) => w.flush(),
            BgzfWriterEnum::MultiThreaded(w) => w.flush(),
        }
    }
}

impl BgzfWriterEnum {
    /// Finish writing and close the writer.
    ///
    /// The multi-threaded writer must be finished explicitly so that every queued block
    /// and the EOF marker reach the file.
    ///
    /// # Errors
    /// Returns an error if flushing or finalizing the writer fails.
    pub fn finish(self) -> io::Result<()> {
        match self {
            BgzfWriterEnum::SingleThreaded(mut w) => {
                w.flush()?;
                // EOF block is written on drop
                Ok(())
            }
            BgzfWriterEnum::MultiThreaded(mut w) => {
                w.finish()?;
                Ok(())
            }
        }
    }
}

/// A BAM writer over either BGZF writer flavour.
pub type BamWriter = noodles::bam::io::Writer<BgzfWriterEnum>;

/// Open a BAM file for reading and read its header.
///
/// # Arguments
/// * `path` - Path to the input BAM file
/// * `threads` - Number of threads for BGZF decompression (1 = single-threaded)
///
/// # Errors
/// Returns an error if the file cannot be opened or the header cannot be read
pub fn create_bam_reader<P: AsRef<Path>>(path: P, threads: usize) -> Result<(BamReader, Header)> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)
        .with_context(|| format!("Failed to open input BAM: {}", path_ref.display()))?;

    let bgzf_reader = match NonZero::new(threads) {
        Some(worker_count) if threads > 1 => {
            BgzfReaderEnum::MultiThreaded(MultithreadedReader::with_worker_count(worker_count, file))
        }
        _ => BgzfReaderEnum::SingleThreaded(BgzfReader::new(file)),
    };

    let mut reader = noodles::bam::io::Reader::from(bgzf_reader);
    let header = reader
        .read_header()
        .with_context(|| format!("Failed to read header from: {}", path_ref.display()))?;

    Ok((reader, header))
}

/// Create a BAM writer and write the header.
///
/// # Arguments
/// * `path` - Path to the output BAM file
/// * `header` - SAM header to write
/// * `threads` - Number of threads for BGZF compression (1 = single-threaded)
///
/// # Errors
/// Returns an error if the file cannot be created or the header cannot be written
pub fn create_bam_writer<P: AsRef<Path>>(
    path: P,
    header: &Header,
    threads: usize,
) -> Result<BamWriter> {
    let path_ref = path.as_ref();
    let output_file = File::create(path_ref)
        .with_context(|| format!("Failed to create output BAM: {}", path_ref.display()))?;

    let bgzf_writer = match NonZero::new(threads) {
        Some(worker_count) if threads > 1 => BgzfWriterEnum::MultiThreaded(
            MultithreadedWriter::with_worker_count(worker_count, output_file),
        ),
        _ => BgzfWriterEnum::SingleThreaded(BgzfWriter::new(output_file)),
    };

    let mut writer = noodles::bam::io::Writer::from(bgzf_writer);
    writer
        .write_header(header)
        .with_context(|| format!("Failed to write header to: {}", path_ref.display()))?;
    Ok(writer)
}
