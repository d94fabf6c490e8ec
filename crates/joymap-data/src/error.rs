//! Error types for dataset loading.

use thiserror::Error;

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading the dataset.
///
/// Every variant is startup-fatal: the dashboard refuses to serve without a
/// complete dataset.
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset file could not be opened or read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not well-formed delimited text
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row
    #[error("Missing required column: {0:?}")]
    MissingColumn(&'static str),

    /// A required cell is empty
    #[error("Row {row}: missing value for column {column:?}")]
    MissingValue { row: usize, column: &'static str },

    /// A cell could not be parsed as the column's type
    #[error("Row {row}: invalid value {value:?} for column {column:?}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// Two records share a region identifier
    #[error("Row {row}: duplicate region id {id}")]
    DuplicateRegion { row: usize, id: u32 },
}
