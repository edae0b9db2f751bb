//! Custom error types for telbam operations.

use thiserror::Error;

/// Result type alias for telbam operations
pub type Result<T> = std::result::Result<T, TelbamError>;

/// Error type for telbam operations
#[derive(Error, Debug)]
pub enum TelbamError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "BAM", "TSV")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A read group was found in an inconsistent state.
    ///
    /// This signals a bug in the upstream record feed and halts the pipeline.
    #[error("Read group '{read_name}' violates an internal invariant: {reason}")]
    InvariantViolation {
        /// The read identifier of the offending group
        read_name: String,
        /// Which rule was broken
        reason: String,
    },

    /// The read data table could not be written
    #[error("Could not save read data to tsv file '{path}': {reason}")]
    ReadDataWrite {
        /// Destination path
        path: String,
        /// Underlying cause
        reason: String,
    },
}
