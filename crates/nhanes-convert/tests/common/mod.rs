//! Fixture files shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use nhanes_sas7bdat::{CellValue, Sas7bdatColumn, Sas7bdatDataset, WriterOptions, write_sas7bdat};
use nhanes_xpt::{
    XptColumn, XptDataset, XptValue, XptVersion, XptWriterOptions, write_xpt,
    write_xpt_with_options,
};

/// A small demographics table with `rows` respondents.
pub fn demographics(name: &str, rows: usize) -> XptDataset {
    let mut dataset = XptDataset::with_columns(
        name,
        vec![
            XptColumn::numeric("SEQN").with_label("Respondent sequence number"),
            XptColumn::character("RIAGENDR", 1).with_label("Gender"),
            XptColumn::numeric("INDFMPIR").with_label("Ratio of family income to poverty"),
        ],
    )
    .with_label("Demographic Variables");
    for i in 0..rows {
        let pir = if i % 3 == 0 {
            XptValue::numeric_missing()
        } else {
            XptValue::numeric(i as f64 / 4.0)
        };
        dataset.add_row(vec![
            XptValue::numeric(93703.0 + i as f64),
            XptValue::character(if i % 2 == 0 { "F" } else { "M" }),
            pir,
        ]);
    }
    dataset
}

/// Write a valid transport file and return its path.
pub fn write_transport(dir: &Path, file: &str, rows: usize) -> PathBuf {
    let path = dir.join(file);
    let name = file.split('.').next().unwrap_or(file);
    write_xpt(&path, &demographics(name, rows)).unwrap();
    path
}

/// Write a transport file whose last observation is cut in half. Only the
/// lenient reader accepts it.
pub fn write_truncated_transport(dir: &Path, file: &str, rows: usize) -> PathBuf {
    let path = write_transport(dir, file, rows);
    let bytes = std::fs::read(&path).unwrap();
    let obs = bytes
        .chunks(80)
        .position(|r| r.starts_with(b"HEADER RECORD*******OBS     HEADER RECORD!!!!!!!"))
        .map(|i| (i + 1) * 80)
        .unwrap();
    // SEQN(8) + RIAGENDR(1) + INDFMPIR(8)
    let cut = obs + (rows - 1) * 17 + 9;
    std::fs::write(&path, &bytes[..cut]).unwrap();
    path
}

/// Write a V8 transport file whose LABELV8 entry count is absurd. Only the
/// lenient reader, which skips a bad label section, accepts it.
pub fn write_bad_label_count(dir: &Path, file: &str) -> PathBuf {
    let path = dir.join(file);
    let mut dataset = XptDataset::with_columns(
        "WHQ_J",
        vec![
            XptColumn::numeric("SEQN"),
            XptColumn::numeric("WHD020")
                .with_label("Current self-reported weight in pounds, as asked at the interview"),
        ],
    );
    dataset.add_row(vec![XptValue::numeric(93705.0), XptValue::numeric(165.0)]);
    let options = XptWriterOptions::default().with_version(XptVersion::V8);
    write_xpt_with_options(&path, &dataset, options).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    let label = bytes
        .chunks(80)
        .position(|r| r.starts_with(b"HEADER RECORD*******LABELV8 HEADER RECORD!!!!!!!"))
        .map(|i| i * 80)
        .unwrap();
    bytes[label + 48..label + 80].copy_from_slice(b"99999999999999999               ");
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Overwrite the row count in a default-layout (64-bit little-endian)
/// SAS7BDAT row size subheader.
pub fn corrupt_legacy_row_count(path: &Path, row_count: u64) {
    let mut bytes = std::fs::read(path).unwrap();
    let subheader = bytes
        .windows(8)
        .position(|w| w == [0xF7, 0xF7, 0xF7, 0xF7, 0, 0, 0, 0])
        .unwrap();
    let at = subheader + 6 * 8;
    bytes[at..at + 8].copy_from_slice(&row_count.to_le_bytes());
    std::fs::write(path, bytes).unwrap();
}

/// Write a SAS7BDAT file under any file name.
pub fn write_legacy(dir: &Path, file: &str, rows: usize) -> PathBuf {
    let path = dir.join(file);
    let mut dataset = Sas7bdatDataset::new(
        "BMX_J",
        vec![
            Sas7bdatColumn::numeric("SEQN").with_label("Respondent sequence number"),
            Sas7bdatColumn::numeric("BMXWT").with_label("Weight (kg)"),
            Sas7bdatColumn::character("BMDSTATS", 8),
        ],
    );
    for i in 0..rows {
        dataset.add_row(vec![
            CellValue::Number(93703.0 + i as f64),
            CellValue::Number(60.5 + i as f64),
            CellValue::Text("complete".to_string()),
        ]);
    }
    write_sas7bdat(&path, &dataset, &WriterOptions::default()).unwrap();
    path
}

/// Write what a failed download usually leaves behind.
pub fn write_html(dir: &Path, file: &str) -> PathBuf {
    let path = dir.join(file);
    std::fs::write(
        &path,
        "<!DOCTYPE html>\n<html><head><title>Page Not Found</title></head></html>\n",
    )
    .unwrap();
    path
}

/// Sorted file names in `dir`, or nothing if it does not exist.
pub fn file_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
