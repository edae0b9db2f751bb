//! Integration tests for telbam.
//!
//! These tests run whole extractions over generated BAM files, both through the library
//! entry point and through the `telbam` binary.

mod helpers;
mod test_extract_command;
mod test_extract_pipeline;
