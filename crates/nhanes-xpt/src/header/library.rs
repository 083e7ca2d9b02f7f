//! Library header record handling.
//!
//! The library header is the first set of records in an XPT file.
//!
//! # Structure
//!
//! 1. Fixed header: `HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!...`
//!    (`LIBV8` in place of `LIBRARY` for V8 files)
//! 2. Real header (80 bytes): SAS version, OS, created datetime
//! 3. Second header (80 bytes): Modified datetime

use crate::error::{Result, XptError};
use crate::types::{XptVersion, XptWriterOptions};

use super::{RECORD_LEN, build_fixed_header, has_prefix, version_tag, write_string};

/// V5 library header prefix.
pub const LIBRARY_HEADER_PREFIX: &str = "HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";

/// V8 library header prefix.
pub const LIBRARY_V8_HEADER_PREFIX: &str = "HEADER RECORD*******LIBV8   HEADER RECORD!!!!!!!";

/// Validate the library header and detect the layout version.
pub fn validate_library_header(record: &[u8]) -> Result<XptVersion> {
    if record.len() < RECORD_LEN {
        return Err(XptError::invalid_format("record too short"));
    }
    if has_prefix(record, "LIBRARY") {
        Ok(XptVersion::V5)
    } else if has_prefix(record, "LIBV8") {
        Ok(XptVersion::V8)
    } else {
        Err(XptError::missing_header("LIBRARY HEADER"))
    }
}

/// Build the fixed library header record.
#[must_use]
pub fn build_library_header(version: XptVersion) -> [u8; RECORD_LEN] {
    build_fixed_header(version_tag("LIBRARY", "LIBV8", version))
}

/// Build the real header record.
///
/// | Offset | Length | Field       |
/// |--------|--------|-------------|
/// | 0-7    | 8      | "SAS"       |
/// | 8-15   | 8      | "SAS"       |
/// | 16-23  | 8      | "SASLIB"    |
/// | 24-31  | 8      | SAS version |
/// | 32-39  | 8      | OS name     |
/// | 40-63  | 24     | blanks      |
/// | 64-79  | 16     | created     |
#[must_use]
pub fn build_real_header(options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, "SAS", 8);
    write_string(&mut record, 16, "SASLIB", 8);
    write_string(&mut record, 24, &options.sas_version, 8);
    write_string(&mut record, 32, &options.os_name, 8);
    write_string(&mut record, 64, &options.header_timestamp(), 16);
    record
}

/// Build the second header record (modified datetime).
#[must_use]
pub fn build_second_header(options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, &options.header_timestamp(), 16);
    record
}
