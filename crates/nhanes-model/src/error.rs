//! Error types for table construction.

use thiserror::Error;

/// Errors raised while assembling a [`Table`](crate::Table).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A column holds a different number of values than the first column.
    #[error("column {column} has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
