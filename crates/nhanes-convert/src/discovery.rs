//! Input file discovery.

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{ConvertError, Result};

/// Default input extension.
pub const DEFAULT_EXTENSION: &str = "xpt";

/// Lists the files in `dir` with the given extension.
///
/// Matching is case-insensitive and ignores a leading dot in `extension`.
/// Returns files sorted by filename.
pub fn list_input_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConvertError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let wanted = extension.trim_start_matches('.');
    let entries = std::fs::read_dir(dir).map_err(|e| ConvertError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    Ok(matching_files(
        dir,
        entries.map(|entry| entry.map(|e| e.path())),
        wanted,
    ))
}

/// Keep regular files with the wanted extension, sorted by name. An entry
/// that cannot be read is logged and skipped.
fn matching_files(
    dir: &Path,
    entries: impl Iterator<Item = io::Result<PathBuf>>,
    wanted: &str,
) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| {
            entry
                .inspect_err(|e| {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                })
                .ok()
        })
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["P_DEMO.xpt", "DEMO_J.XPT", "BMX_J.xpt", "DEMO_J.txt", "notes.csv"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.xpt")).unwrap();
        dir
    }

    #[test]
    fn test_list_input_files() {
        let dir = create_test_dir();
        let files = list_input_files(dir.path(), "xpt").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["BMX_J.xpt", "DEMO_J.XPT", "P_DEMO.xpt"]);
    }

    #[test]
    fn test_other_extension() {
        let dir = create_test_dir();
        assert_eq!(list_input_files(dir.path(), ".csv").unwrap().len(), 1);
        assert!(list_input_files(dir.path(), "sas7bdat").unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_entry_is_skipped() {
        let dir = create_test_dir();
        let entries = vec![
            Ok(dir.path().join("P_DEMO.xpt")),
            Err(io::Error::other("stale handle")),
            Ok(dir.path().join("BMX_J.xpt")),
        ];
        let files = matching_files(dir.path(), entries.into_iter(), "xpt");
        assert_eq!(
            files,
            [dir.path().join("BMX_J.xpt"), dir.path().join("P_DEMO.xpt")]
        );
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            list_input_files(&dir.path().join("xpt_files"), "xpt"),
            Err(ConvertError::DirectoryNotFound { .. })
        ));
    }
}
