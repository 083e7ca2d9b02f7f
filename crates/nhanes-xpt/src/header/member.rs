//! Per-member records, in file order: MEMBER and DSCRPTR tags, the member
//! data record (name, release, host, timestamp), the member second record
//! (timestamp, label, type), the NAMESTR tag with the variable count, the
//! NAMESTRs themselves, then the OBS tag. V8 swaps the tags for `MEMBV8`,
//! `DSCPTV8`, `NAMSTV8` and `OBSV8`.

use crate::error::{Result, XptError};
use crate::types::{XptDataset, XptVersion, XptWriterOptions};

use super::{
    RECORD_LEN, build_fixed_header, has_prefix, read_number, read_string, version_tag,
    write_string,
};

fn validate_tagged(
    record: &[u8],
    v5: &'static str,
    v8: &'static str,
    expected: &'static str,
) -> Result<XptVersion> {
    if record.len() < RECORD_LEN {
        return Err(XptError::invalid_format(format!(
            "{} too short",
            expected.to_lowercase()
        )));
    }
    if has_prefix(record, v5) {
        Ok(XptVersion::V5)
    } else if has_prefix(record, v8) {
        Ok(XptVersion::V8)
    } else {
        Err(XptError::missing_header(expected))
    }
}

/// Validate a member header record.
pub fn validate_member_header(record: &[u8]) -> Result<XptVersion> {
    validate_tagged(record, "MEMBER", "MEMBV8", "MEMBER HEADER")
}

/// Whether a record is a member header (start of another dataset).
#[must_use]
pub fn is_member_header(record: &[u8]) -> bool {
    validate_member_header(record).is_ok()
}

/// Validate a DSCRPTR header record.
pub fn validate_dscrptr_header(record: &[u8]) -> Result<XptVersion> {
    validate_tagged(record, "DSCRPTR", "DSCPTV8", "DSCRPTR HEADER")
}

/// Validate a NAMESTR header record.
pub fn validate_namestr_header(record: &[u8]) -> Result<XptVersion> {
    validate_tagged(record, "NAMESTR", "NAMSTV8", "NAMESTR HEADER")
}

/// Validate an OBS header record.
pub fn validate_obs_header(record: &[u8]) -> Result<XptVersion> {
    validate_tagged(record, "OBS", "OBSV8", "OBS HEADER")
}

/// NAMESTR width from the ASCII digits at bytes 74..78 of the member tag.
pub fn parse_namestr_len(record: &[u8]) -> Result<usize> {
    if record.len() < 78 {
        return Err(XptError::invalid_format("member header too short"));
    }
    read_number(record, 74, 4).ok_or_else(|| XptError::NumericParse {
        field: "NAMESTR length".to_string(),
    })
}

/// Variable count at byte 54: four digits in V5, six in V8.
pub fn parse_variable_count(record: &[u8], version: XptVersion) -> Result<usize> {
    let width = match version {
        XptVersion::V5 => 4,
        XptVersion::V8 => 6,
    };
    if record.len() < 54 + width {
        return Err(XptError::invalid_format("namestr header too short"));
    }
    read_number(record, 54, width).ok_or_else(|| XptError::NumericParse {
        field: "variable count".to_string(),
    })
}

/// Dataset name at byte 8. Blank names come back empty.
#[must_use]
pub fn parse_dataset_name(record: &[u8], version: XptVersion) -> String {
    read_string(record, 8, version.name_limit())
}

/// Parse dataset label from member second record.
///
/// Dataset label is at offset 32-71 (40 characters).
#[must_use]
pub fn parse_dataset_label(record: &[u8]) -> Option<String> {
    let label = read_string(record, 32, 40);
    if label.is_empty() { None } else { Some(label) }
}

/// Parse dataset type from member second record.
///
/// Dataset type is at offset 72-79 (8 characters).
#[must_use]
pub fn parse_dataset_type(record: &[u8]) -> Option<String> {
    let dtype = read_string(record, 72, 8);
    if dtype.is_empty() { None } else { Some(dtype) }
}

/// Build member header record with NAMESTR length.
#[must_use]
pub fn build_member_header(version: XptVersion, namestr_len: usize) -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(version_tag("MEMBER", "MEMBV8", version));

    // Descriptor header size at offset 64-67
    write_string(&mut record, 64, "0160", 4);

    // NAMESTR length at offset 74-77
    write_string(&mut record, 74, &format!("{namestr_len:04}"), 4);

    record
}

/// Build DSCRPTR header record.
#[must_use]
pub fn build_dscrptr_header(version: XptVersion) -> [u8; RECORD_LEN] {
    build_fixed_header(version_tag("DSCRPTR", "DSCPTV8", version))
}

/// Build member data record.
#[must_use]
pub fn build_member_data(dataset: &XptDataset, options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    match options.version {
        XptVersion::V5 => {
            write_string(&mut record, 8, &dataset.name, 8);
            write_string(&mut record, 16, "SASDATA", 8);
            write_string(&mut record, 24, &options.sas_version, 8);
            write_string(&mut record, 32, &options.os_name, 8);
        }
        XptVersion::V8 => {
            write_string(&mut record, 8, &dataset.name, 32);
            write_string(&mut record, 40, "SASDATA", 8);
            write_string(&mut record, 48, &options.sas_version, 8);
            write_string(&mut record, 56, &options.os_name, 8);
        }
    }
    write_string(&mut record, 64, &options.header_timestamp(), 16);
    record
}

/// Build member second record.
#[must_use]
pub fn build_member_second(dataset: &XptDataset, options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, &options.header_timestamp(), 16);
    write_string(&mut record, 32, dataset.label.as_deref().unwrap_or(""), 40);
    write_string(
        &mut record,
        72,
        dataset.dataset_type.as_deref().unwrap_or(""),
        8,
    );
    record
}

/// Build NAMESTR header record with variable count.
#[must_use]
pub fn build_namestr_header(version: XptVersion, var_count: usize) -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(version_tag("NAMESTR", "NAMSTV8", version));
    match version {
        XptVersion::V5 => write_string(&mut record, 54, &format!("{var_count:04}"), 4),
        XptVersion::V8 => write_string(&mut record, 54, &format!("{var_count:06}"), 6),
    }
    record
}

/// Build OBS header record.
#[must_use]
pub fn build_obs_header(version: XptVersion) -> [u8; RECORD_LEN] {
    build_fixed_header(version_tag("OBS", "OBSV8", version))
}

/// Calculate total NAMESTR block size including padding.
#[must_use]
pub fn namestr_block_size(var_count: usize, namestr_len: usize) -> usize {
    align_to_record(var_count * namestr_len)
}

/// Align a size to the next record boundary (80 bytes).
#[must_use]
pub fn align_to_record(size: usize) -> usize {
    size.div_ceil(RECORD_LEN) * RECORD_LEN
}
