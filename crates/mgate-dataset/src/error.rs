//! Dataset / schema error type.

use std::fmt;

/// Errors produced while loading or transforming a test set.
#[derive(Debug)]
pub enum SchemaError {
    /// File open / read failure.
    Io(String),
    /// Structural CSV failure (ragged row, bad header, encoding).
    Csv(String),
    /// The fixed target column is missing from the dataset.
    MissingTarget { column: String },
    /// A cell could not be parsed into the expected type.
    BadCell {
        row: usize,
        column: String,
        raw: String,
    },
    /// The dataset has a header but zero data rows.
    Empty,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Io(msg) => write!(f, "dataset io error: {msg}"),
            SchemaError::Csv(msg) => write!(f, "dataset csv error: {msg}"),
            SchemaError::MissingTarget { column } => {
                write!(f, "dataset is missing target column '{column}'")
            }
            SchemaError::BadCell { row, column, raw } => {
                write!(f, "row {row}: cannot parse column '{column}' from value '{raw}'")
            }
            SchemaError::Empty => write!(f, "dataset has no data rows"),
        }
    }
}

impl std::error::Error for SchemaError {}
