//! Error types for conversion.

use std::path::PathBuf;

use thiserror::Error;

/// I/O-level failures of the converter.
///
/// These concern one file or the input directory; parse failures are
/// reported through [`StrategyError`] and never abort a batch.
#[derive(Debug, Error)]
pub enum ConvertError {
    // === Directory Errors ===
    /// Input directory not found.
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === File Errors ===
    /// Source file metadata could not be read (usually: it does not exist).
    #[error("failed to read metadata of {}: {source}", path.display())]
    FileMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Output Errors ===
    #[error("failed to write CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The temp file was written but could not replace the target.
    #[error("failed to move {} to {}: {source}", temp_path.display(), target_path.display())]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// One strategy's rejection of a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{strategy}: {message}")]
pub struct StrategyError {
    /// Name of the strategy that failed.
    pub strategy: String,
    pub message: String,
}

impl StrategyError {
    pub fn new(strategy: impl Into<String>, message: impl ToString) -> Self {
        Self {
            strategy: strategy.into(),
            message: message.to_string(),
        }
    }
}
