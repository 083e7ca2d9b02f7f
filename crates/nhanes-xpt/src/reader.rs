//! XPT file reader.
//!
//! Reads the first member of a SAS Transport file. Strict reading requires
//! the exact record layout; lenient reading tolerates the damage commonly
//! found in downloaded public-use files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::error::{NameKind, Result, XptError};
use crate::float::{ibm_to_ieee, is_missing};
use crate::header::{
    NAMESTR_LEN, RECORD_LEN, align_to_record, decode, is_label_header, is_member_header,
    parse_dataset_label, parse_dataset_type, parse_label_section, parse_namestr_len,
    parse_namestr_records, parse_variable_count, read_text, validate_dscrptr_header,
    validate_library_header, validate_member_header, validate_namestr_header, validate_obs_header,
};
use crate::types::{
    MissingValue, NumericValue, TextEncoding, XptColumn, XptDataset, XptReaderOptions, XptType,
    XptValue, XptVersion,
};

/// XPT file reader.
///
/// Reads SAS Transport V5 or V8 format files with auto-detection.
pub struct XptReader<R: Read> {
    reader: BufReader<R>,
    options: XptReaderOptions,
}

impl<R: Read> XptReader<R> {
    /// Create a new XPT reader.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, XptReaderOptions::default())
    }

    /// Create a new XPT reader with options.
    pub fn with_options(reader: R, options: XptReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the entire input into memory and parse the first dataset.
    pub fn read_dataset(mut self) -> Result<XptDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_xpt_data(&data, &self.options)
    }
}

impl XptReader<File> {
    /// Open an XPT file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, XptReaderOptions::default())
    }

    /// Open an XPT file with options.
    pub fn open_with_options(path: &Path, options: XptReaderOptions) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                XptError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                XptError::Io(e)
            }
        })?;
        Ok(Self::with_options(file, options))
    }
}

/// Read an XPT file from a path with strict defaults.
pub fn read_xpt(path: &Path) -> Result<XptDataset> {
    XptReader::open(path)?.read_dataset()
}

/// Read an XPT file with options.
pub fn read_xpt_with_options(path: &Path, options: XptReaderOptions) -> Result<XptDataset> {
    XptReader::open_with_options(path, options)?.read_dataset()
}

/// Parse an XPT file already held in memory.
pub fn read_xpt_bytes(data: &[u8], options: &XptReaderOptions) -> Result<XptDataset> {
    parse_xpt_data(data, options)
}

/// Byte ranges of one member, located before any text is decoded.
struct MemberLayout {
    version: XptVersion,
    namestr_len: usize,
    var_count: usize,
    member_data: usize,
    member_second: usize,
    namestr_start: usize,
    label_section: Option<(usize, usize)>,
    obs_start: usize,
}

fn parse_xpt_data(data: &[u8], options: &XptReaderOptions) -> Result<XptDataset> {
    if data.len() < RECORD_LEN * 8 {
        return Err(XptError::invalid_format("file too small"));
    }

    // Observations never extend into padding added below.
    let content_end = data.len();
    let padded;
    let data = if data.len().is_multiple_of(RECORD_LEN) {
        data
    } else if options.strict {
        return Err(XptError::invalid_format(
            "file length is not a multiple of 80",
        ));
    } else {
        let mut buf = data.to_vec();
        buf.resize(align_to_record(buf.len()), b' ');
        padded = buf;
        padded.as_slice()
    };

    let layout = locate_member(data, options)?;
    let obs_end = next_member_offset(data, layout.obs_start).min(content_end);

    let columns = parse_namestr_records(
        &data[layout.namestr_start..],
        layout.var_count,
        layout.namestr_len,
        layout.version,
        UTF_8,
    )?;
    let obs_len = observation_length(&columns)?;
    let obs = observation_block(data, layout.obs_start, obs_end, obs_len, options)?;

    let (encoding, encoding_name) = match options.encoding {
        TextEncoding::Utf8Lossy => (UTF_8, None),
        TextEncoding::Fixed(encoding) => (encoding, Some(encoding.name().to_string())),
        TextEncoding::Detect => {
            let namestr_end = layout.namestr_start + layout.var_count * layout.namestr_len;
            let namestr = &data[layout.namestr_start..namestr_end];
            let (encoding, name) =
                detect_encoding(text_fields(namestr, layout.namestr_len, obs, obs_len, &columns));
            (encoding, Some(name.to_string()))
        }
    };

    let mut columns = if encoding == UTF_8 {
        columns
    } else {
        parse_namestr_records(
            &data[layout.namestr_start..],
            layout.var_count,
            layout.namestr_len,
            layout.version,
            encoding,
        )?
    };

    if let Some((start, end)) = layout.label_section {
        let header = read_record(data, start)?;
        match parse_label_section(header, &data[start + RECORD_LEN..end], encoding) {
            Ok(entries) => entries.iter().for_each(|entry| entry.apply(&mut columns)),
            Err(e) if options.strict => return Err(e),
            Err(_) => {}
        }
    }

    let member_data = read_record(data, layout.member_data)?;
    let name = read_text(member_data, 8, layout.version.name_limit(), encoding);
    if name.is_empty() && options.strict {
        return Err(XptError::invalid_name(NameKind::Dataset, name));
    }

    let member_second = read_record(data, layout.member_second)?;
    let rows = parse_observations(obs, obs_len, &columns, encoding, options);

    Ok(XptDataset {
        name,
        label: parse_dataset_label(member_second),
        dataset_type: parse_dataset_type(member_second),
        columns,
        rows,
        version: layout.version,
        encoding: encoding_name,
    })
}

/// Walk the header records of the first member.
fn locate_member(data: &[u8], options: &XptReaderOptions) -> Result<MemberLayout> {
    let version = validate_library_header(read_record(data, 0)?)?;

    // Library real header and modified header
    let mut offset = RECORD_LEN * 3;

    let member_header = read_record(data, offset)?;
    validate_member_header(member_header)?;
    let namestr_len = match parse_namestr_len(member_header) {
        Ok(len) if len > 0 => len,
        Ok(_) if !options.strict => NAMESTR_LEN,
        Err(_) if !options.strict => NAMESTR_LEN,
        Ok(len) => {
            return Err(XptError::invalid_format(format!(
                "invalid NAMESTR length {len}"
            )));
        }
        Err(e) => return Err(e),
    };
    offset += RECORD_LEN;

    validate_dscrptr_header(read_record(data, offset)?)?;
    offset += RECORD_LEN;

    let member_data = offset;
    read_record(data, member_data)?;
    offset += RECORD_LEN;

    let member_second = offset;
    read_record(data, member_second)?;
    offset += RECORD_LEN;

    let namestr_header = read_record(data, offset)?;
    validate_namestr_header(namestr_header)?;
    let var_count = parse_variable_count(namestr_header, version)?;
    offset += RECORD_LEN;

    let namestr_start = offset;
    let namestr_total = var_count
        .checked_mul(namestr_len)
        .ok_or(XptError::ObservationOverflow)?;
    if namestr_start
        .checked_add(namestr_total)
        .is_none_or(|end| end > data.len())
    {
        return Err(XptError::RecordOutOfBounds {
            offset: namestr_start,
        });
    }
    offset = align_to_record(namestr_start + namestr_total);

    let mut label_section = None;
    if is_label_header(read_record(data, offset)?).is_some() {
        let start = offset;
        let mut end = offset + RECORD_LEN;
        while end + RECORD_LEN <= data.len()
            && validate_obs_header(&data[end..end + RECORD_LEN]).is_err()
        {
            end += RECORD_LEN;
        }
        label_section = Some((start, end));
        offset = end;
    }

    validate_obs_header(read_record(data, offset)?)?;
    offset += RECORD_LEN;

    Ok(MemberLayout {
        version,
        namestr_len,
        var_count,
        member_data,
        member_second,
        namestr_start,
        label_section,
        obs_start: offset,
    })
}

/// Offset of the next record-aligned member header, or the end of data.
fn next_member_offset(data: &[u8], from: usize) -> usize {
    let mut offset = from;
    while offset + RECORD_LEN <= data.len() {
        if is_member_header(&data[offset..offset + RECORD_LEN]) {
            return offset;
        }
        offset += RECORD_LEN;
    }
    data.len()
}

fn read_record(data: &[u8], offset: usize) -> Result<&[u8]> {
    data.get(offset..offset + RECORD_LEN)
        .ok_or(XptError::RecordOutOfBounds { offset })
}

fn observation_length(columns: &[XptColumn]) -> Result<usize> {
    columns.iter().try_fold(0usize, |total, column| {
        total
            .checked_add(column.length as usize)
            .ok_or(XptError::ObservationOverflow)
    })
}

/// Slice the complete observations between `start` and `end`.
///
/// Trailing all-space observations are record padding and are dropped. A
/// partial observation with data in it is an error in strict mode and is
/// discarded otherwise.
fn observation_block<'a>(
    data: &'a [u8],
    start: usize,
    end: usize,
    obs_len: usize,
    options: &XptReaderOptions,
) -> Result<&'a [u8]> {
    if obs_len == 0 || start >= end {
        return Ok(&[]);
    }

    let region = &data[start..end];
    let mut rows_total = region.len() / obs_len;
    let remainder = &region[rows_total * obs_len..];
    if options.strict && remainder.iter().any(|&b| b != b' ') {
        return Err(XptError::TrailingBytes);
    }

    while rows_total > 0 {
        let row = &region[(rows_total - 1) * obs_len..rows_total * obs_len];
        if row.iter().all(|&b| b == b' ') {
            rows_total -= 1;
        } else {
            break;
        }
    }

    Ok(&region[..rows_total * obs_len])
}

/// Raw bytes of every text field: NAMESTR names and labels plus character
/// observation values.
fn text_fields<'a>(
    namestr: &'a [u8],
    namestr_len: usize,
    obs: &'a [u8],
    obs_len: usize,
    columns: &'a [XptColumn],
) -> impl Iterator<Item = &'a [u8]> + 'a {
    let header_text = namestr
        .chunks(namestr_len)
        .flat_map(|record| [record.get(8..56), record.get(88..120)])
        .flatten();

    let char_fields: Vec<(usize, usize)> = columns
        .iter()
        .scan(0usize, |pos, column| {
            let start = *pos;
            *pos += column.length as usize;
            Some((start, column))
        })
        .filter(|(_, column)| column.data_type == XptType::Char)
        .map(|(start, column)| (start, start + column.length as usize))
        .collect();

    let values = obs.chunks(obs_len.max(1)).flat_map(move |row| {
        char_fields
            .iter()
            .filter_map(|&(start, end)| row.get(start..end))
            .collect::<Vec<_>>()
    });

    header_text.chain(values)
}

/// Choose the text encoding of a file from its raw text fields.
///
/// Pure ASCII is reported as `US-ASCII`; valid UTF-8 as `UTF-8`; anything
/// else is decoded as `windows-1252`. A multi-byte sequence cut at the end
/// of a fixed-width field still counts as UTF-8.
pub fn detect_encoding<'a>(
    fields: impl IntoIterator<Item = &'a [u8]>,
) -> (&'static Encoding, &'static str) {
    let mut ascii = true;
    for field in fields {
        if field.is_ascii() {
            continue;
        }
        ascii = false;
        if let Err(e) = std::str::from_utf8(field) {
            if e.error_len().is_some() {
                return (WINDOWS_1252, "windows-1252");
            }
        }
    }
    if ascii {
        (UTF_8, "US-ASCII")
    } else {
        (UTF_8, "UTF-8")
    }
}

fn parse_observations(
    obs: &[u8],
    obs_len: usize,
    columns: &[XptColumn],
    encoding: &'static Encoding,
    options: &XptReaderOptions,
) -> Vec<Vec<XptValue>> {
    if obs_len == 0 {
        return Vec::new();
    }
    obs.chunks_exact(obs_len)
        .map(|row| parse_row(row, columns, encoding, options.trim_strings))
        .collect()
}

fn parse_row(
    row_bytes: &[u8],
    columns: &[XptColumn],
    encoding: &'static Encoding,
    trim: bool,
) -> Vec<XptValue> {
    let mut values = Vec::with_capacity(columns.len());
    let mut pos = 0usize;

    for column in columns {
        let len = column.length as usize;
        let slice = &row_bytes[pos..pos + len];

        let value = match column.data_type {
            XptType::Char => XptValue::Char(decode_char(slice, encoding, trim)),
            XptType::Num => XptValue::Num(decode_numeric(slice)),
        };

        values.push(value);
        pos += len;
    }

    values
}

fn decode_char(bytes: &[u8], encoding: &'static Encoding, trim: bool) -> String {
    let text = if encoding == UTF_8 {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        decode(bytes, encoding)
    };
    if trim {
        text.trim_end_matches([' ', '\0']).to_string()
    } else {
        text
    }
}

fn decode_numeric(bytes: &[u8]) -> NumericValue {
    if bytes.is_empty() {
        return NumericValue::Missing(MissingValue::Standard);
    }
    if let Some(missing) = is_missing(bytes) {
        return NumericValue::Missing(missing);
    }

    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    NumericValue::Value(ibm_to_ieee(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_char() {
        assert_eq!(decode_char(b"hello   ", UTF_8, true), "hello");
        assert_eq!(decode_char(b"hello   ", UTF_8, false), "hello   ");
        assert_eq!(decode_char(b"", UTF_8, true), "");
        assert_eq!(decode_char(b"caf\xe9 ", WINDOWS_1252, true), "café");
    }

    #[test]
    fn test_decode_numeric_missing() {
        let result = decode_numeric(&[0x2e, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(result.missing_type(), Some(MissingValue::Standard));

        let result = decode_numeric(&[0x41, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(result.missing_type(), Some(MissingValue::Special('A')));
    }

    #[test]
    fn test_decode_numeric_value() {
        let one = [0x41, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let value = decode_numeric(&one).value().unwrap();
        assert!((value - 1.0).abs() < 1e-10);

        // Truncated 3-byte field
        let value = decode_numeric(&[0x41, 0x10, 0x00]).value().unwrap();
        assert!((value - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_observation_length() {
        let columns = vec![XptColumn::numeric("A"), XptColumn::character("B", 20)];
        assert_eq!(observation_length(&columns).unwrap(), 28);
    }

    #[test]
    fn test_detect_encoding() {
        let ascii: [&[u8]; 2] = [b"SEQN", b"Male"];
        assert_eq!(detect_encoding(ascii).1, "US-ASCII");

        let utf8: [&[u8]; 1] = ["Niño".as_bytes()];
        assert_eq!(detect_encoding(utf8).1, "UTF-8");

        // "ñ" cut in half at the field boundary
        let cut: [&[u8]; 1] = [&"Niñ".as_bytes()[..3]];
        assert_eq!(detect_encoding(cut).1, "UTF-8");

        let latin: [&[u8]; 1] = [b"Ni\xf1o"];
        assert_eq!(detect_encoding(latin), (WINDOWS_1252, "windows-1252"));
    }

    #[test]
    fn test_observation_block_trailing() {
        let strict = XptReaderOptions::default();
        let lenient = XptReaderOptions::lenient();

        let mut data = vec![b'x'; 16];
        data.extend_from_slice(b"yy      ");
        assert!(matches!(
            observation_block(&data, 0, data.len(), 16, &strict),
            Err(XptError::TrailingBytes)
        ));
        assert_eq!(observation_block(&data, 0, data.len(), 16, &lenient).unwrap().len(), 16);

        let mut data = vec![b'x'; 16];
        data.extend_from_slice(&[b' '; 24]);
        assert_eq!(observation_block(&data, 0, data.len(), 16, &strict).unwrap().len(), 16);
    }
}
