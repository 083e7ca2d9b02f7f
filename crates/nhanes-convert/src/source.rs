//! Source file identity.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{ConvertError, Result};

/// A downloaded input file: path, size and modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

impl SourceFile {
    /// Read the file system metadata of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|source| ConvertError::FileMetadata {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(ConvertError::FileMetadata {
                path: path.to_path_buf(),
                source: std::io::Error::other("not a regular file"),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        })
    }

    /// File name with extension, e.g. `DEMO_J.xpt`.
    #[must_use]
    pub fn name(&self) -> String {
        file_name(&self.path)
    }

    /// File name without extension, e.g. `DEMO_J`.
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
