//! LABELV8/LABELV9 extension sections.
//!
//! V8 files store variable names longer than 8 characters and labels longer
//! than 40 characters in a section between the NAMESTR records and the OBS
//! header. The section header carries the entry count at offset 48.
//!
//! LABELV8 entry: `varnum`, `namelen`, `lablen` (big-endian shorts), then the
//! name and label bytes.
//!
//! LABELV9 entry: `varnum`, `namelen`, `lablen`, `fmtlen`, `infmtlen`, then
//! the name, label, format and informat bytes.

use encoding_rs::Encoding;

use crate::error::{Result, XptError};
use crate::types::XptColumn;

use super::member::align_to_record;
use super::{RECORD_LEN, build_fixed_header, decode, has_prefix, read_number, write_string};

/// Which extension section a header introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSectionType {
    /// Long names and labels.
    V8,
    /// Long names, labels, formats and informats.
    V9,
}

/// One entry of a label section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    /// 1-based variable number.
    pub varnum: usize,
    pub name: String,
    pub label: String,
    pub format: Option<String>,
    pub informat: Option<String>,
}

impl LabelEntry {
    /// Apply the entry to the matching column.
    pub fn apply(&self, columns: &mut [XptColumn]) {
        let Some(column) = self.varnum.checked_sub(1).and_then(|i| columns.get_mut(i)) else {
            return;
        };
        if !self.name.is_empty() {
            column.name.clone_from(&self.name);
        }
        if !self.label.is_empty() {
            column.label = Some(self.label.clone());
        }
        if let Some(format) = &self.format {
            column.format = Some(format.clone());
        }
        if let Some(informat) = &self.informat {
            column.informat = Some(informat.clone());
        }
    }
}

/// Detect a LABELV8 or LABELV9 section header.
#[must_use]
pub fn is_label_header(record: &[u8]) -> Option<LabelSectionType> {
    if has_prefix(record, "LABELV8") {
        Some(LabelSectionType::V8)
    } else if has_prefix(record, "LABELV9") {
        Some(LabelSectionType::V9)
    } else {
        None
    }
}

/// Parse a label section given its header record and the bytes after it.
///
/// Trailing padding in `body` is ignored.
pub fn parse_label_section(
    header: &[u8],
    body: &[u8],
    encoding: &'static Encoding,
) -> Result<Vec<LabelEntry>> {
    let kind = is_label_header(header).ok_or(XptError::missing_header("LABELV8 HEADER"))?;
    let count = read_number(header, 48, 32).unwrap_or(0);
    let mut cursor = Cursor { data: body, pos: 0 };
    // Each entry holds at least three shorts.
    let mut entries = Vec::with_capacity(count.min(body.len() / 6));

    for _ in 0..count {
        let varnum = cursor.short()?;
        let name_len = cursor.short()?;
        let label_len = cursor.short()?;
        let (format_len, informat_len) = match kind {
            LabelSectionType::V8 => (0, 0),
            LabelSectionType::V9 => (cursor.short()?, cursor.short()?),
        };

        let name = cursor.text(name_len, encoding)?;
        let label = cursor.text(label_len, encoding)?;
        let (format, informat) = match kind {
            LabelSectionType::V8 => (None, None),
            LabelSectionType::V9 => (
                Some(cursor.text(format_len, encoding)?).filter(|f| !f.is_empty()),
                Some(cursor.text(informat_len, encoding)?).filter(|f| !f.is_empty()),
            ),
        };

        entries.push(LabelEntry {
            varnum,
            name,
            label,
            format,
            informat,
        });
    }

    Ok(entries)
}

/// Build a LABELV8 section for columns that do not fit a V5 NAMESTR.
///
/// Returns an empty buffer when every name and label fits.
#[must_use]
pub fn build_label_section(columns: &[XptColumn]) -> Vec<u8> {
    let long: Vec<(usize, &XptColumn)> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name.len() > 8 || c.label.as_ref().is_some_and(|l| l.len() > 40))
        .collect();
    if long.is_empty() {
        return Vec::new();
    }

    let mut header = build_fixed_header("LABELV8");
    write_string(&mut header, 48, &long.len().to_string(), 30);

    let mut out = header.to_vec();
    let start = out.len();
    for (idx, column) in long {
        let label = column.label.as_deref().unwrap_or("");
        out.extend_from_slice(&((idx + 1) as i16).to_be_bytes());
        out.extend_from_slice(&(column.name.len() as i16).to_be_bytes());
        out.extend_from_slice(&(label.len() as i16).to_be_bytes());
        out.extend_from_slice(column.name.as_bytes());
        out.extend_from_slice(label.as_bytes());
    }
    let padded = start + align_to_record(out.len() - start);
    out.resize(padded, b' ');
    debug_assert_eq!(out.len() % RECORD_LEN, 0);
    out
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn take(&mut self, len: usize) -> Result<&[u8]> {
        let bytes = self
            .pos
            .checked_add(len)
            .and_then(|end| self.data.get(self.pos..end))
            .ok_or(XptError::RecordOutOfBounds { offset: self.pos })?;
        self.pos += len;
        Ok(bytes)
    }

    fn short(&mut self) -> Result<usize> {
        let bytes = self.take(2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]).max(0) as usize)
    }

    fn text(&mut self, len: usize, encoding: &'static Encoding) -> Result<String> {
        let bytes = self.take(len)?;
        Ok(decode(bytes, encoding).trim_end_matches([' ', '\0']).to_string())
    }
}
