//! Transport file errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why a transport file could not be read or written.
#[derive(Debug, Error)]
pub enum XptError {
    // === I/O ===
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    // === Record layout ===
    /// Anything structurally wrong that has no more specific variant.
    #[error("not a SAS transport file: {message}")]
    InvalidFormat { message: String },

    #[error("expected {expected} record")]
    MissingHeader { expected: &'static str },

    #[error("bad NAMESTR #{index}: {message}")]
    InvalidNamestr { index: usize, message: String },

    #[error("numeric header field unreadable: {field}")]
    NumericParse { field: String },

    #[error("record at byte {offset} runs past the end of the file")]
    RecordOutOfBounds { offset: usize },

    #[error("observation length overflows")]
    ObservationOverflow,

    /// Bytes after the last observation that are not blank padding.
    #[error("non-blank bytes after the last observation")]
    TrailingBytes,

    // === Names and shapes (writer, strict reader) ===
    #[error("invalid {what} name '{name}'")]
    InvalidName { what: NameKind, name: String },

    #[error("variable {name} appears twice")]
    DuplicateVariable { name: String },

    #[error("variable {name} has zero length")]
    ZeroLength { name: String },

    #[error("numeric variable {name} has length {length}, expected 2 to 8")]
    NumericLength { name: String, length: u16 },

    #[error("value in column {name} does not match its type")]
    ValueTypeMismatch { name: String },

    #[error("row has {actual} values, dataset has {expected} columns")]
    RowLengthMismatch { expected: usize, actual: usize },
}

/// Which name an [`XptError::InvalidName`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Dataset,
    Variable,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Dataset => "dataset",
            Self::Variable => "variable",
        })
    }
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, XptError>;

impl XptError {
    pub(crate) fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub(crate) fn missing_header(expected: &'static str) -> Self {
        Self::MissingHeader { expected }
    }

    pub(crate) fn invalid_namestr(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidNamestr {
            index,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_name(what: NameKind, name: impl Into<String>) -> Self {
        Self::InvalidName {
            what,
            name: name.into(),
        }
    }
}
