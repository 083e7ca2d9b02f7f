//! Output sinks with temp-file-and-rename writes.
//!
//! A target file is either fully written or left untouched.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nhanes_model::Table;

use crate::error::{ConvertError, Result};

/// `<target>.tmp` next to the target.
fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map_or_else(OsString::new, ToOwned::to_owned);
    name.push(".tmp");
    target.with_file_name(name)
}

/// Write `target` through a synced temp file, then rename it into place.
///
/// The temp file is removed when `write` or any later step fails.
pub fn write_atomic<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConvertError::io("create directory", parent, e))?;
    }

    let temp = temp_path(target);
    let result = write_temp(&temp, write).and_then(|()| {
        fs::rename(&temp, target).map_err(|source| ConvertError::AtomicWriteFailed {
            temp_path: temp.clone(),
            target_path: target.to_path_buf(),
            source,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

fn write_temp<F>(temp: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(temp).map_err(|e| ConvertError::io("create", temp, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    let file = writer
        .into_inner()
        .map_err(|e| ConvertError::io("write", temp, e.into_error()))?;
    file.sync_all().map_err(|e| ConvertError::io("sync", temp, e))
}

/// Write a table as CSV: header row of column names, one line per row.
pub fn write_csv(table: &Table, target: &Path) -> Result<()> {
    let csv_error = |source| ConvertError::Csv {
        path: target.to_path_buf(),
        source,
    };
    write_atomic(target, |out| {
        let mut writer = csv::Writer::from_writer(out);
        if table.column_count() > 0 {
            writer.write_record(table.column_names()).map_err(csv_error)?;
        }
        for row in table.rows() {
            writer
                .write_record(row.iter().map(ToString::to_string))
                .map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|e| ConvertError::io("write", target, e))
    })
}

/// Write UTF-8 text.
pub fn write_text(text: &str, target: &Path) -> Result<()> {
    write_atomic(target, |out| {
        out.write_all(text.as_bytes())
            .map_err(|e| ConvertError::io("write", target, e))
    })
}
