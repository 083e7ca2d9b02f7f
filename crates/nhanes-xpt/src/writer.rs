//! Transport writer for a single member, V5 or V8.
//!
//! Used to build fixtures; NHANES itself only ever ships files to read.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{NameKind, Result, XptError};
use crate::float::{encode_missing, ieee_to_ibm, truncate_ibm};
use crate::header::{
    RECORD_LEN, build_dscrptr_header, build_label_section, build_library_header,
    build_member_data, build_member_header, build_member_second, build_namestr,
    build_namestr_header, build_obs_header, build_real_header, build_second_header,
};
use crate::types::{NumericValue, XptDataset, XptValue, XptVersion, XptWriterOptions};

pub struct XptWriter<W: Write> {
    out: BufWriter<W>,
    options: XptWriterOptions,
}

impl<W: Write> XptWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_options(out, XptWriterOptions::default())
    }

    pub fn with_options(out: W, options: XptWriterOptions) -> Self {
        Self {
            out: BufWriter::new(out),
            options,
        }
    }

    /// Write one dataset: library and member headers, NAMESTRs, the V8 label
    /// section, then observations.
    pub fn write_dataset(mut self, dataset: &XptDataset) -> Result<()> {
        let version = self.options.version;
        validate_dataset(dataset, version)?;

        let headers = [
            build_library_header(version),
            build_real_header(&self.options),
            build_second_header(&self.options),
            build_member_header(version, self.options.namestr_length),
            build_dscrptr_header(version),
            build_member_data(dataset, &self.options),
            build_member_second(dataset, &self.options),
            build_namestr_header(version, dataset.columns.len()),
        ];
        for record in &headers {
            self.out.write_all(record)?;
        }
        self.out.write_all(&self.namestr_block(dataset))?;
        if version == XptVersion::V8 {
            self.out.write_all(&build_label_section(&dataset.columns))?;
        }
        self.out.write_all(&build_obs_header(version))?;
        self.out.write_all(&self.observation_block(dataset))?;
        self.out.flush()?;
        Ok(())
    }

    fn namestr_block(&self, dataset: &XptDataset) -> Vec<u8> {
        let width = self.options.namestr_length;
        let mut block = Vec::with_capacity(dataset.columns.len() * width);
        let mut offset = 0u32;
        for (number, column) in (1u16..).zip(&dataset.columns) {
            let namestr = build_namestr(column, number, offset, self.options.version);
            block.extend_from_slice(&namestr[..width.min(namestr.len())]);
            offset = offset.saturating_add(u32::from(column.length));
        }
        pad_to_record(&mut block);
        block
    }

    fn observation_block(&self, dataset: &XptDataset) -> Vec<u8> {
        let mut block = Vec::with_capacity(dataset.rows.len() * dataset.observation_length());
        for row in &dataset.rows {
            for (value, column) in row.iter().zip(&dataset.columns) {
                match value {
                    XptValue::Char(text) => encode_char(&mut block, text, column.length),
                    XptValue::Num(number) => {
                        block.extend(encode_numeric(number, column.length, &self.options));
                    }
                }
            }
        }
        pad_to_record(&mut block);
        block
    }
}

/// Write a dataset as a V5 file.
pub fn write_xpt(path: &Path, dataset: &XptDataset) -> Result<()> {
    write_xpt_with_options(path, dataset, XptWriterOptions::default())
}

pub fn write_xpt_with_options(
    path: &Path,
    dataset: &XptDataset,
    options: XptWriterOptions,
) -> Result<()> {
    XptWriter::with_options(File::create(path)?, options).write_dataset(dataset)
}

fn validate_dataset(dataset: &XptDataset, version: XptVersion) -> Result<()> {
    let name = normalize_name(&dataset.name);
    if name.is_empty() || name.len() > version.name_limit() {
        return Err(XptError::invalid_name(NameKind::Dataset, &dataset.name));
    }

    let mut seen = BTreeSet::new();
    for column in &dataset.columns {
        let col_name = normalize_name(&column.name);

        if col_name.is_empty() || col_name.len() > version.name_limit() {
            return Err(XptError::invalid_name(NameKind::Variable, &column.name));
        }

        if !seen.insert(col_name) {
            return Err(XptError::DuplicateVariable {
                name: column.name.clone(),
            });
        }

        if column.length == 0 {
            return Err(XptError::ZeroLength {
                name: column.name.clone(),
            });
        }
        if column.is_numeric() && !(2..=8).contains(&column.length) {
            return Err(XptError::NumericLength {
                name: column.name.clone(),
                length: column.length,
            });
        }
    }

    for row in &dataset.rows {
        if row.len() != dataset.columns.len() {
            return Err(XptError::RowLengthMismatch {
                expected: dataset.columns.len(),
                actual: row.len(),
            });
        }
        for (value, column) in row.iter().zip(&dataset.columns) {
            if matches!(value, XptValue::Num(_)) != column.is_numeric() {
                return Err(XptError::ValueTypeMismatch {
                    name: column.name.clone(),
                });
            }
        }
    }

    Ok(())
}

fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Append `text` cut at a character boundary and space padded to `length`.
fn encode_char(out: &mut Vec<u8>, text: &str, length: u16) {
    let width = usize::from(length);
    let mut end = text.len().min(width);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    out.extend_from_slice(&text.as_bytes()[..end]);
    out.resize(out.len() + width - end, b' ');
}

fn encode_numeric(value: &NumericValue, length: u16, options: &XptWriterOptions) -> Vec<u8> {
    let full = match value {
        NumericValue::Missing(code) => encode_missing(*code),
        NumericValue::Value(v) if !v.is_finite() => encode_missing(options.missing_numeric),
        NumericValue::Value(v) => ieee_to_ibm(*v),
    };
    truncate_ibm(full, usize::from(length))
}

/// Space-fill the tail so the block ends on an 80-byte boundary.
fn pad_to_record(block: &mut Vec<u8>) {
    let rem = block.len() % RECORD_LEN;
    if rem != 0 {
        block.resize(block.len() + RECORD_LEN - rem, b' ');
    }
}
