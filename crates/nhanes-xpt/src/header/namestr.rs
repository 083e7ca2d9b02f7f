//! NAMESTR record parsing and building.
//!
//! The NAMESTR record describes a single variable in an XPT dataset.
//! Each NAMESTR is 140 bytes (or 136 bytes for VAX/VMS).
//!
//! # NAMESTR Structure (140 bytes)
//!
//! | Offset  | Field    | Type     | Description                    |
//! |---------|----------|----------|--------------------------------|
//! | 0-1     | ntype    | short    | 1=NUMERIC, 2=CHAR              |
//! | 2-3     | nhfun    | short    | Hash (always 0)                |
//! | 4-5     | nlng     | short    | Variable length in observation |
//! | 6-7     | nvar0    | short    | Variable number                |
//! | 8-15    | nname    | char[8]  | Variable name                  |
//! | 16-55   | nlabel   | char[40] | Variable label                 |
//! | 56-63   | nform    | char[8]  | Format name                    |
//! | 64-65   | nfl      | short    | Format field length            |
//! | 66-67   | nfd      | short    | Format decimals                |
//! | 68-69   | nfj      | short    | Justification (0=left, 1=right)|
//! | 70-71   | nfill    | char[2]  | Padding                        |
//! | 72-79   | niform   | char[8]  | Informat name                  |
//! | 80-81   | nifl     | short    | Informat length                |
//! | 82-83   | nifd     | short    | Informat decimals              |
//! | 84-87   | npos     | long     | Position in observation        |
//! | 88-119  | longname | char[32] | V8 long variable name          |
//! | 120-121 | lablen   | short    | V8 label length                |
//! | 122-139 | rest     | char[18] | Reserved                       |

use encoding_rs::Encoding;

use crate::error::{Result, XptError};
use crate::types::{Justification, XptColumn, XptType, XptVersion};

use super::{read_text, write_string};

/// Standard NAMESTR length.
pub const NAMESTR_LEN: usize = 140;

/// VAX/VMS NAMESTR length (shorter reserved section).
pub const NAMESTR_LEN_VAX: usize = 136;

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Parse a single NAMESTR record into an XptColumn.
///
/// V8 records carry the long variable name at offset 88; it wins over the
/// 8-character short name when present.
pub fn parse_namestr(
    data: &[u8],
    index: usize,
    version: XptVersion,
    encoding: &'static Encoding,
) -> Result<XptColumn> {
    if data.len() < 88 {
        return Err(XptError::invalid_namestr(
            index,
            format!("data too short: {} bytes", data.len()),
        ));
    }

    let ntype = read_i16(data, 0);
    let data_type = XptType::from_ntype(ntype)
        .ok_or_else(|| XptError::invalid_namestr(index, format!("invalid ntype: {ntype}")))?;

    let length = read_i16(data, 4);
    if length <= 0 {
        return Err(XptError::invalid_namestr(index, "variable length is zero"));
    }

    let short_name = read_text(data, 8, 8, encoding);
    let name = match version {
        XptVersion::V8 if data.len() >= 120 => {
            let long_name = read_text(data, 88, 32, encoding);
            if long_name.is_empty() { short_name } else { long_name }
        }
        _ => short_name,
    };
    if name.is_empty() {
        return Err(XptError::invalid_namestr(index, "empty variable name"));
    }

    Ok(XptColumn {
        name,
        label: non_empty(read_text(data, 16, 40, encoding)),
        data_type,
        length: length as u16,
        format: non_empty(read_text(data, 56, 8, encoding)),
        format_length: read_i16(data, 64).max(0) as u16,
        format_decimals: read_i16(data, 66).max(0) as u16,
        informat: non_empty(read_text(data, 72, 8, encoding)),
        informat_length: read_i16(data, 80).max(0) as u16,
        informat_decimals: read_i16(data, 82).max(0) as u16,
        justification: Justification::from_nfj(read_i16(data, 68)),
    })
}

/// Build a NAMESTR record from an XptColumn.
///
/// `varnum` is 1-based; `position` is the byte offset in the observation.
#[must_use]
pub fn build_namestr(
    column: &XptColumn,
    varnum: u16,
    position: u32,
    version: XptVersion,
) -> [u8; NAMESTR_LEN] {
    let mut buf = [0u8; NAMESTR_LEN];

    write_i16(&mut buf, 0, column.data_type.to_ntype());
    write_i16(&mut buf, 4, column.length as i16);
    write_i16(&mut buf, 6, varnum as i16);
    write_string(&mut buf, 8, &column.name, 8);

    let label = column.label.as_deref().unwrap_or("");
    write_string(&mut buf, 16, label, 40);

    write_string(&mut buf, 56, column.format.as_deref().unwrap_or(""), 8);
    write_i16(&mut buf, 64, column.format_length as i16);
    write_i16(&mut buf, 66, column.format_decimals as i16);
    write_i16(&mut buf, 68, column.justification.to_nfj());

    write_string(&mut buf, 72, column.informat.as_deref().unwrap_or(""), 8);
    write_i16(&mut buf, 80, column.informat_length as i16);
    write_i16(&mut buf, 82, column.informat_decimals as i16);

    buf[84..88].copy_from_slice(&(position as i32).to_be_bytes());

    if version == XptVersion::V8 {
        write_string(&mut buf, 88, &column.name, 32);
        write_i16(&mut buf, 120, label.len().min(i16::MAX as usize) as i16);
    }

    buf
}

/// Parse `var_count` consecutive NAMESTR records.
pub fn parse_namestr_records(
    data: &[u8],
    var_count: usize,
    namestr_len: usize,
    version: XptVersion,
    encoding: &'static Encoding,
) -> Result<Vec<XptColumn>> {
    let mut columns = Vec::with_capacity(var_count.min(data.len() / namestr_len.max(1)));

    for idx in 0..var_count {
        let offset = idx
            .checked_mul(namestr_len)
            .ok_or(XptError::ObservationOverflow)?;
        let record = offset
            .checked_add(namestr_len)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| XptError::invalid_namestr(idx, "NAMESTR data out of bounds"))?;
        columns.push(parse_namestr(record, idx, version, encoding)?);
    }

    Ok(columns)
}

fn read_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([data[offset], data[offset + 1]])
}

fn write_i16(buf: &mut [u8], offset: usize, value: i16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    #[test]
    fn test_build_parse_roundtrip() {
        let column = XptColumn::character("RIAGENDR", 1)
            .with_label("Gender")
            .with_format("$CHAR", 1, 0);
        let record = build_namestr(&column, 1, 0, XptVersion::V5);
        let parsed = parse_namestr(&record, 0, XptVersion::V5, UTF_8).unwrap();

        assert_eq!(parsed.name, "RIAGENDR");
        assert_eq!(parsed.label.as_deref(), Some("Gender"));
        assert_eq!(parsed.data_type, XptType::Char);
        assert_eq!(parsed.length, 1);
        assert_eq!(parsed.format.as_deref(), Some("$CHAR"));
        assert_eq!(parsed.format_length, 1);
    }

    #[test]
    fn test_v8_long_name() {
        let column = XptColumn::numeric("INTERVIEW_WEIGHT_2YR");
        let record = build_namestr(&column, 1, 0, XptVersion::V8);

        let v8 = parse_namestr(&record, 0, XptVersion::V8, UTF_8).unwrap();
        assert_eq!(v8.name, "INTERVIEW_WEIGHT_2YR");

        let v5 = parse_namestr(&record, 0, XptVersion::V5, UTF_8).unwrap();
        assert_eq!(v5.name, "INTERVIE");
    }

    #[test]
    fn test_position_field() {
        let column = XptColumn::numeric("WTINT2YR");
        let record = build_namestr(&column, 3, 24, XptVersion::V5);
        assert_eq!(i32::from_be_bytes([record[84], record[85], record[86], record[87]]), 24);
        assert_eq!(read_i16(&record, 6), 3);
    }

    #[test]
    fn test_invalid_records() {
        let mut record = build_namestr(&XptColumn::numeric("SEQN"), 1, 0, XptVersion::V5);
        record[1] = 7;
        assert!(parse_namestr(&record, 0, XptVersion::V5, UTF_8).is_err());

        let record = build_namestr(&XptColumn::numeric(""), 1, 0, XptVersion::V5);
        assert!(parse_namestr(&record, 0, XptVersion::V5, UTF_8).is_err());

        assert!(parse_namestr(&[0u8; 40], 0, XptVersion::V5, UTF_8).is_err());
    }

    #[test]
    fn test_parse_multiple_records() {
        let mut data = Vec::new();
        data.extend_from_slice(&build_namestr(&XptColumn::numeric("SEQN"), 1, 0, XptVersion::V5));
        data.extend_from_slice(&build_namestr(
            &XptColumn::character("SDMVPSU", 2),
            2,
            8,
            XptVersion::V5,
        ));

        let columns = parse_namestr_records(&data, 2, NAMESTR_LEN, XptVersion::V5, UTF_8).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].name, "SDMVPSU");

        assert!(parse_namestr_records(&data, 3, NAMESTR_LEN, XptVersion::V5, UTF_8).is_err());
    }
}
