//! CLI command implementations for telbam.
//!
//! - [`extract`] - Extract telomeric read groups from an aligned BAM

pub mod command;
pub mod common;
pub mod extract;
