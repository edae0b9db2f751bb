//! Input validation utilities
//!
//! Validation functions for command-line parameters and file paths with consistent
//! error messages. All of them return structured errors from [`crate::errors`].

use crate::errors::{Result, TelbamError};
use std::fmt::Display;
use std::path::Path;

/// Validate that a file exists
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use telbam_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/file.bam", "Input BAM");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(TelbamError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path_ref.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that an optional read data output path names a gzip file.
///
/// The read data table is always written compressed, and compression is chosen from the
/// `.gz` extension.
///
/// # Errors
/// Returns an error if the path is set and does not end with `.gz`
///
/// # Example
/// ```
/// use telbam_lib::validation::validate_gzip_output;
/// use std::path::Path;
///
/// validate_gzip_output(Some(Path::new("reads.tsv.gz")), "read-data").unwrap();
/// validate_gzip_output(None, "read-data").unwrap();
/// assert!(validate_gzip_output(Some(Path::new("reads.tsv")), "read-data").is_err());
/// ```
pub fn validate_gzip_output(path: Option<&Path>, name: &str) -> Result<()> {
    match path {
        Some(p) if p.extension().is_none_or(|ext| ext != "gz") => {
            Err(TelbamError::InvalidParameter {
                parameter: name.to_string(),
                reason: format!("Output must be gzip compressed (.gz), got: {}", p.display()),
            })
        }
        _ => Ok(()),
    }
}

/// Validate that a value is at least `min`
///
/// # Errors
/// Returns an error if `value < min`
///
/// # Example
/// ```
/// use telbam_lib::validation::validate_at_least;
///
/// validate_at_least(4, 1, "min-telomere-repeats").unwrap();
/// assert!(validate_at_least(0, 1, "queue-capacity").is_err());
/// ```
pub fn validate_at_least<T: PartialOrd + Display>(value: T, min: T, name: &str) -> Result<()> {
    if value < min {
        return Err(TelbamError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("must be >= {min}, got {value}"),
        });
    }
    Ok(())
}
