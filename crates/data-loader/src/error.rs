//! Error types for the data-loader crate.
//!
//! Only failures that make the whole input unusable live here (missing
//! files, unreadable CSV, absent columns). Per-row problems such as an
//! empty required cell are not errors: the row is dropped and counted.

use thiserror::Error;

/// Errors that can occur while loading the movie and credits tables
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the input (bad quoting, invalid UTF-8, ...)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column the pipeline depends on is not present in the header row
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
