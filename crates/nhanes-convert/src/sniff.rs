//! Input sniffing from the first bytes of a file.
//!
//! Used for logging and for failure hints. A download that saved an error
//! page under a `.xpt` name is the common case this catches.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use nhanes_sas7bdat::MAGIC;
use nhanes_xpt::XptVersion;
use nhanes_xpt::header::validate_library_header;

use crate::error::{ConvertError, Result};

/// Bytes read from the start of a file.
pub const SNIFF_LEN: usize = 512;

/// What the first bytes of a file look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSignature {
    Transport(XptVersion),
    Sas7bdat,
    Html,
    Empty,
    Unknown,
}

impl FileSignature {
    /// Explanation to attach to a total parse failure, if any.
    #[must_use]
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::Html => Some("file looks like an HTML document"),
            Self::Empty => Some("file is empty"),
            Self::Unknown => Some("file is neither SAS transport nor SAS7BDAT"),
            Self::Transport(_) | Self::Sas7bdat => None,
        }
    }
}

impl fmt::Display for FileSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(XptVersion::V5) => write!(f, "SAS transport V5"),
            Self::Transport(XptVersion::V8) => write!(f, "SAS transport V8"),
            Self::Sas7bdat => write!(f, "SAS7BDAT"),
            Self::Html => write!(f, "HTML"),
            Self::Empty => write!(f, "empty"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Read at most [`SNIFF_LEN`] bytes of `path` and classify them.
pub fn sniff(path: &Path) -> Result<FileSignature> {
    let file = File::open(path).map_err(|e| ConvertError::io("open", path, e))?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .map_err(|e| ConvertError::io("read", path, e))?;
    Ok(classify(&head))
}

/// Classify the leading bytes of a file.
#[must_use]
pub fn classify(head: &[u8]) -> FileSignature {
    if head.is_empty() {
        return FileSignature::Empty;
    }
    if head.starts_with(&MAGIC) {
        return FileSignature::Sas7bdat;
    }
    if let Ok(version) = validate_library_header(head) {
        return FileSignature::Transport(version);
    }
    if looks_like_html(head) {
        return FileSignature::Html;
    }
    FileSignature::Unknown
}

fn looks_like_html(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head).to_ascii_lowercase();
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<!doctype html") || trimmed.starts_with("<html") || text.contains("<html")
}
