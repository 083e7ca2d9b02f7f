//! XPT header record parsing and building.
//!
//! This module handles the various header records in an XPT file:
//! - Library headers (file-level metadata)
//! - Member headers (dataset-level metadata)
//! - NAMESTR records (variable definitions)
//! - LABELV8/LABELV9 sections (long names and labels)
//! - OBS header (marks start of observation data)

pub mod label;
pub mod library;
pub mod member;
pub mod namestr;

pub use label::{
    LabelEntry, LabelSectionType, build_label_section, is_label_header, parse_label_section,
};
pub use library::{
    LIBRARY_HEADER_PREFIX, LIBRARY_V8_HEADER_PREFIX, build_library_header, build_real_header,
    build_second_header, validate_library_header,
};
pub use member::{
    align_to_record, build_dscrptr_header, build_member_data, build_member_header,
    build_member_second, build_namestr_header, build_obs_header, is_member_header,
    namestr_block_size, parse_dataset_label, parse_dataset_name, parse_dataset_type,
    parse_namestr_len, parse_variable_count, validate_dscrptr_header, validate_member_header,
    validate_namestr_header, validate_obs_header,
};
pub use namestr::{NAMESTR_LEN, NAMESTR_LEN_VAX, build_namestr, parse_namestr, parse_namestr_records};

use encoding_rs::Encoding;

use crate::types::XptVersion;

/// Record length in bytes.
pub const RECORD_LEN: usize = 80;

/// Length of the fixed `HEADER RECORD*******XXXXXXXXHEADER RECORD!!!!!!!` prefix.
pub const HEADER_PREFIX_LEN: usize = 48;

/// Build the 48-byte prefix of a header record for the given tag.
#[must_use]
pub fn header_prefix(tag: &str) -> String {
    format!("HEADER RECORD*******{tag:<8}HEADER RECORD!!!!!!!")
}

/// Header tags that differ between V5 and V8.
pub(crate) fn version_tag(v5: &'static str, v8: &'static str, version: XptVersion) -> &'static str {
    match version {
        XptVersion::V5 => v5,
        XptVersion::V8 => v8,
    }
}

/// Build a fixed header record with the given tag.
///
/// The prefix is followed by zeros up to offset 78 and two spaces.
pub(crate) fn build_fixed_header(tag: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    let prefix = header_prefix(tag);
    record[..HEADER_PREFIX_LEN].copy_from_slice(&prefix.as_bytes()[..HEADER_PREFIX_LEN]);
    record[HEADER_PREFIX_LEN..78].fill(b'0');
    record
}

/// Check whether a record starts with the header prefix for a tag.
pub(crate) fn has_prefix(record: &[u8], tag: &str) -> bool {
    record.starts_with(header_prefix(tag).as_bytes())
}

/// Read a string from a byte slice, trimming trailing spaces and NULs.
pub(crate) fn read_string(data: &[u8], offset: usize, len: usize) -> String {
    read_text(data, offset, len, encoding_rs::UTF_8)
}

/// Read a string with an explicit encoding, trimming trailing spaces and NULs.
pub(crate) fn read_text(data: &[u8], offset: usize, len: usize, encoding: &'static Encoding) -> String {
    data.get(offset..offset + len)
        .map(|slice| decode(slice, encoding).trim_end_matches([' ', '\0']).to_string())
        .unwrap_or_default()
}

/// Decode bytes without BOM sniffing.
pub(crate) fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Write a string to a buffer, truncated to `len` bytes and space padded.
pub(crate) fn write_string(buf: &mut [u8], offset: usize, value: &str, len: usize) {
    let field = &mut buf[offset..offset + len];
    field.fill(b' ');
    let bytes = value.as_bytes();
    let copy_len = bytes.len().min(len);
    field[..copy_len].copy_from_slice(&bytes[..copy_len]);
}

/// Parse an ASCII decimal field.
pub(crate) fn read_number(data: &[u8], offset: usize, len: usize) -> Option<usize> {
    read_string(data, offset, len).trim().parse().ok()
}
