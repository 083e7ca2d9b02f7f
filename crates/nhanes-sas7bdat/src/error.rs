//! Error types for SAS7BDAT reading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing SAS7BDAT data.
#[derive(Debug, Error)]
pub enum Sas7bdatError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The file does not start with the SAS7BDAT signature.
    #[error("not a SAS7BDAT file")]
    NotSas7bdat,

    #[error("invalid header: {message}")]
    InvalidHeader { message: String },

    #[error("invalid page {page}: {message}")]
    InvalidPage { page: usize, message: String },

    #[error("invalid subheader: {message}")]
    InvalidSubheader { message: String },

    /// Read past the end of the data.
    #[error("truncated data at offset {offset}")]
    Truncated { offset: usize },

    #[error("compressed SAS7BDAT files are not supported")]
    Compressed,

    #[error("missing {0} subheader")]
    MissingMetadata(&'static str),

    #[error("column {name} lies outside the {row_length}-byte row")]
    ColumnOutOfBounds { name: String, row_length: usize },

    #[error("cannot write dataset: {message}")]
    Unwritable { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Sas7bdatError {
    pub(crate) fn header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    pub(crate) fn page(page: usize, message: impl Into<String>) -> Self {
        Self::InvalidPage {
            page,
            message: message.into(),
        }
    }

    pub(crate) fn subheader(message: impl Into<String>) -> Self {
        Self::InvalidSubheader {
            message: message.into(),
        }
    }

    pub(crate) fn unwritable(message: impl Into<String>) -> Self {
        Self::Unwritable {
            message: message.into(),
        }
    }
}

/// Result type for SAS7BDAT operations.
pub type Result<T> = std::result::Result<T, Sas7bdatError>;
