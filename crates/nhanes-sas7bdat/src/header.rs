//! File header parsing and building.
//!
//! # Structure
//!
//! | Offset      | Length | Field                                   |
//! |-------------|--------|-----------------------------------------|
//! | 0-31        | 32     | Signature                               |
//! | 32          | 1      | `'3'` for 64-bit integers               |
//! | 35          | 1      | `'3'` shifts the fields below by 4      |
//! | 37          | 1      | 1 = little-endian                       |
//! | 70          | 1      | Encoding code                           |
//! | 92-155      | 64     | Dataset name                            |
//! | 164 + a     | 8      | Created (seconds since 1960)            |
//! | 172 + a     | 8      | Modified (seconds since 1960)           |
//! | 196 + a     | 4      | Header length                           |
//! | 200 + a     | 4      | Page length                             |
//! | 204 + a     | 4 or 8 | Page count                              |

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::bytes::{ByteView, put_f64, put_uint};
use crate::constants::{
    ALIGN_1_OFFSET, ALIGN_2_OFFSET, ALIGN_MARKER, CREATED_OFFSET, DATASET_NAME_LEN,
    DATASET_NAME_OFFSET, ENCODING_LATIN1, ENCODING_OFFSET, ENCODING_UTF8, ENCODING_WLATIN1,
    ENDIANNESS_OFFSET, FILE_TYPE_OFFSET, HEADER_SIZE_OFFSET, MAGIC, MIN_HEADER_LEN,
    MODIFIED_OFFSET, PAGE_COUNT_OFFSET, PAGE_SIZE_OFFSET, PLATFORM_OFFSET, SAS_FILE_OFFSET,
};
use crate::error::{Result, Sas7bdatError};
use crate::types::{Bitness, Endianness, Layout};

/// Parsed file header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub layout: Layout,
    /// Extra alignment applied to the timestamp and size fields.
    pub align: usize,
    pub dataset_name: String,
    pub encoding_code: u8,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    pub header_length: usize,
    pub page_length: usize,
    pub page_count: usize,
}

impl Header {
    /// Parse the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < MAGIC.len() || data[..MAGIC.len()] != MAGIC {
            return Err(Sas7bdatError::NotSas7bdat);
        }
        if data.len() < MIN_HEADER_LEN {
            return Err(Sas7bdatError::header("file shorter than the header"));
        }

        let bitness = if data[ALIGN_2_OFFSET] == ALIGN_MARKER {
            Bitness::B64
        } else {
            Bitness::B32
        };
        let align = if data[ALIGN_1_OFFSET] == ALIGN_MARKER { 4 } else { 0 };
        let endianness = if data[ENDIANNESS_OFFSET] == 0x01 {
            Endianness::Little
        } else {
            Endianness::Big
        };
        let layout = Layout::new(bitness, endianness);
        let view = ByteView::new(data, endianness);

        let encoding_code = data[ENCODING_OFFSET];
        let encoding = text_encoding(encoding_code);
        let (name, _) =
            encoding.decode_without_bom_handling(view.slice(DATASET_NAME_OFFSET, DATASET_NAME_LEN)?);
        let dataset_name = name.trim_end_matches([' ', '\0']).trim().to_string();

        let created = sas_timestamp(view.f64(CREATED_OFFSET + align)?);
        let modified = sas_timestamp(view.f64(MODIFIED_OFFSET + align)?);
        let header_length = view.usize(HEADER_SIZE_OFFSET + align, 4)?;
        let page_length = view.usize(PAGE_SIZE_OFFSET + align, 4)?;
        let page_count = view.usize(PAGE_COUNT_OFFSET + align, layout.int_len())?;

        if header_length < MIN_HEADER_LEN {
            return Err(Sas7bdatError::header(format!(
                "header length {header_length} is too small"
            )));
        }
        if page_length == 0 {
            return Err(Sas7bdatError::header("page length is zero"));
        }

        Ok(Self {
            layout,
            align,
            dataset_name,
            encoding_code,
            created,
            modified,
            header_length,
            page_length,
            page_count,
        })
    }

    /// Encoding used to decode text.
    #[must_use]
    pub fn text_encoding(&self) -> &'static Encoding {
        text_encoding(self.encoding_code)
    }

    /// Name of the declared encoding, when the code is recognised.
    #[must_use]
    pub fn encoding_name(&self) -> Option<&'static str> {
        match self.encoding_code {
            ENCODING_UTF8 => Some("UTF-8"),
            ENCODING_LATIN1 => Some("ISO-8859-1"),
            ENCODING_WLATIN1 => Some("windows-1252"),
            _ => None,
        }
    }

    /// Serialise the header into a zeroed buffer of `header_length` bytes.
    pub(crate) fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.header_length];
        let endianness = self.layout.endianness;
        let align = self.align;

        buf[..MAGIC.len()].copy_from_slice(&MAGIC);
        buf[ALIGN_2_OFFSET] = match self.layout.bitness {
            Bitness::B64 => ALIGN_MARKER,
            Bitness::B32 => b'2',
        };
        buf[ALIGN_1_OFFSET] = if align == 4 { ALIGN_MARKER } else { b'2' };
        buf[ENDIANNESS_OFFSET] = match endianness {
            Endianness::Little => 0x01,
            Endianness::Big => 0x00,
        };
        buf[PLATFORM_OFFSET] = b'1';
        buf[ENCODING_OFFSET] = self.encoding_code;
        put_text(&mut buf, SAS_FILE_OFFSET, "SAS FILE", 8);
        put_text(&mut buf, DATASET_NAME_OFFSET, &self.dataset_name, DATASET_NAME_LEN);
        put_text(&mut buf, FILE_TYPE_OFFSET, "DATA", 8);

        put_f64(&mut buf, CREATED_OFFSET + align, to_sas_seconds(self.created), endianness);
        put_f64(&mut buf, MODIFIED_OFFSET + align, to_sas_seconds(self.modified), endianness);
        put_uint(&mut buf, HEADER_SIZE_OFFSET + align, 4, self.header_length as u64, endianness);
        put_uint(&mut buf, PAGE_SIZE_OFFSET + align, 4, self.page_length as u64, endianness);
        put_uint(
            &mut buf,
            PAGE_COUNT_OFFSET + align,
            self.layout.int_len(),
            self.page_count as u64,
            endianness,
        );
        buf
    }
}

fn text_encoding(code: u8) -> &'static Encoding {
    if code == ENCODING_UTF8 { UTF_8 } else { WINDOWS_1252 }
}

fn put_text(buf: &mut [u8], offset: usize, value: &str, len: usize) {
    let field = &mut buf[offset..offset + len];
    field.fill(b' ');
    let bytes = value.as_bytes();
    let n = bytes.len().min(len);
    field[..n].copy_from_slice(&bytes[..n]);
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1960, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn sas_timestamp(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64)?;
    epoch().checked_add_signed(delta)
}

fn to_sas_seconds(value: Option<NaiveDateTime>) -> f64 {
    value.map_or(0.0, |dt| (dt - epoch()).num_milliseconds() as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(layout: Layout) -> Header {
        Header {
            layout,
            align: if layout.bitness == Bitness::B64 { 4 } else { 0 },
            dataset_name: "DEMO".to_string(),
            encoding_code: ENCODING_UTF8,
            created: NaiveDate::from_ymd_opt(2019, 6, 1).and_then(|d| d.and_hms_opt(9, 30, 0)),
            modified: None,
            header_length: 1024,
            page_length: 4096,
            page_count: 3,
        }
    }

    #[test]
    fn test_build_parse_all_layouts() {
        for bitness in [Bitness::B32, Bitness::B64] {
            for endianness in [Endianness::Little, Endianness::Big] {
                let header = sample(Layout::new(bitness, endianness));
                let parsed = Header::parse(&header.build()).unwrap();
                assert_eq!(parsed.layout, header.layout);
                assert_eq!(parsed.dataset_name, "DEMO");
                assert_eq!(parsed.created, header.created);
                assert_eq!(parsed.page_length, 4096);
                assert_eq!(parsed.page_count, 3);
                assert_eq!(parsed.encoding_name(), Some("UTF-8"));
            }
        }
    }

    #[test]
    fn test_rejects_other_files() {
        assert!(matches!(
            Header::parse(b"HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!"),
            Err(Sas7bdatError::NotSas7bdat)
        ));
        assert!(matches!(
            Header::parse(&MAGIC),
            Err(Sas7bdatError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_zero_page_length() {
        let mut header = sample(Layout::default());
        header.page_length = 0;
        assert!(Header::parse(&header.build()).is_err());
    }
}
