//! Uncompressed SAS7BDAT writer.
//!
//! Output is one metadata page holding every subheader, followed by data
//! pages. With [`WriterOptions::mix_page`] the first page becomes a mix page
//! and carries as many rows as fit below its pointers.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::bytes::{put_f64, put_uint};
use crate::constants::{
    ENCODING_LATIN1, ENCODING_UTF8, ENCODING_WLATIN1, FORMAT_INDEX_OFFSET, FORMAT_LENGTH_OFFSET,
    FORMAT_START_OFFSET, LABEL_INDEX_OFFSET, LABEL_LENGTH_OFFSET, LABEL_START_OFFSET,
    MIN_HEADER_LEN, MIX_PAGE_ROW_COUNT_MULTIPLIER, PAGE_DATA, PAGE_META, PAGE_MIX,
    ROW_COUNT_MULTIPLIER, ROW_LENGTH_MULTIPLIER, SIG_COLUMN_ATTRIBUTES, SIG_COLUMN_NAME,
    SIG_COLUMN_SIZE, SIG_COLUMN_TEXT, SIG_FORMAT_LABEL, SIG_ROW_SIZE, SUBHEADER_POINTERS_OFFSET,
};
use crate::error::{Result, Sas7bdatError};
use crate::header::Header;
use crate::types::{
    Bitness, CellValue, ColumnType, Endianness, Layout, Sas7bdatColumn, Sas7bdatDataset,
};

/// Bytes before the first string in a column text block.
const TEXT_BLOCK_PREFIX: usize = 12;

/// Page sizes are rounded up to this when the requested size is too small.
const PAGE_ROUNDING: usize = 1024;

/// Options for [`write_sas7bdat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Requested page length; grown when the metadata or a row does not fit.
    pub page_length: usize,
    pub header_length: usize,
    /// Store the first rows on the metadata page.
    pub mix_page: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            page_length: 4096,
            header_length: 1024,
            mix_page: false,
        }
    }
}

impl WriterOptions {
    #[must_use]
    pub fn with_page_length(mut self, page_length: usize) -> Self {
        self.page_length = page_length;
        self
    }

    #[must_use]
    pub fn with_mix_page(mut self, mix_page: bool) -> Self {
        self.mix_page = mix_page;
        self
    }
}

/// Write a dataset to a SAS7BDAT file.
///
/// Column offsets are recomputed from column order and lengths. The byte
/// order and integer width come from `dataset.layout`.
pub fn write_sas7bdat(path: &Path, dataset: &Sas7bdatDataset, options: &WriterOptions) -> Result<()> {
    let bytes = write_sas7bdat_bytes(dataset, options)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Serialise a dataset to SAS7BDAT bytes.
pub fn write_sas7bdat_bytes(dataset: &Sas7bdatDataset, options: &WriterOptions) -> Result<Vec<u8>> {
    validate(dataset, options)?;

    let layout = dataset.layout;
    let encoding_code = encoding_code(dataset.encoding.as_deref());
    let encoding = if encoding_code == ENCODING_UTF8 {
        UTF_8
    } else {
        WINDOWS_1252
    };

    let columns = place_columns(&dataset.columns);
    let row_length: usize = columns.iter().map(|c| c.length).sum();
    let rows = dataset
        .rows
        .iter()
        .map(|row| encode_row(row, &columns, row_length, layout.endianness, encoding))
        .collect::<Vec<_>>();

    let mut subheaders = vec![Vec::new(), column_size(layout, columns.len())];
    subheaders.extend(column_metadata(&columns, layout, encoding)?);
    let meta_len = row_size_len(layout) + subheaders.iter().map(Vec::len).sum::<usize>();

    let bit_offset = layout.page_bit_offset();
    let pointers_end =
        bit_offset + SUBHEADER_POINTERS_OFFSET + subheaders.len() * layout.pointer_len();
    let rows_start = pointers_end + pointers_end % 8;
    let page_length = options
        .page_length
        .max((rows_start + meta_len).next_multiple_of(PAGE_ROUNDING))
        .max((bit_offset + SUBHEADER_POINTERS_OFFSET + row_length).next_multiple_of(PAGE_ROUNDING));

    let mix_capacity = if options.mix_page && row_length > 0 {
        (page_length - meta_len - rows_start) / row_length
    } else {
        0
    };
    subheaders[0] = row_size(layout, row_length, rows.len(), columns.len(), mix_capacity);

    let mix_rows = mix_capacity.min(rows.len());
    let mut pages = vec![metadata_page(
        layout,
        page_length,
        &subheaders,
        &rows[..mix_rows],
        rows_start,
        options.mix_page,
    )];
    if row_length > 0 {
        let per_page = (page_length - bit_offset - SUBHEADER_POINTERS_OFFSET) / row_length;
        pages.extend(
            rows[mix_rows..]
                .chunks(per_page)
                .map(|chunk| data_page(layout, page_length, chunk)),
        );
    }

    let header = Header {
        layout,
        align: if layout.bitness == Bitness::B64 { 4 } else { 0 },
        dataset_name: dataset.name.clone(),
        encoding_code,
        created: dataset.created,
        modified: dataset.modified,
        header_length: options.header_length,
        page_length,
        page_count: pages.len(),
    };

    let mut out = header.build();
    out.reserve(pages.len() * page_length);
    for page in pages {
        out.extend_from_slice(&page);
    }
    Ok(out)
}

fn validate(dataset: &Sas7bdatDataset, options: &WriterOptions) -> Result<()> {
    if options.header_length < MIN_HEADER_LEN {
        return Err(Sas7bdatError::unwritable(format!(
            "header length must be at least {MIN_HEADER_LEN}"
        )));
    }

    for column in &dataset.columns {
        if column.name.trim().is_empty() {
            return Err(Sas7bdatError::unwritable("column with an empty name"));
        }
        let valid_length = match column.column_type {
            ColumnType::Number => (2..=8).contains(&column.length),
            ColumnType::Character => column.length > 0,
        };
        if !valid_length {
            return Err(Sas7bdatError::unwritable(format!(
                "column {} has invalid length {}",
                column.name, column.length
            )));
        }
    }

    for (index, row) in dataset.rows.iter().enumerate() {
        if row.len() != dataset.columns.len() {
            return Err(Sas7bdatError::unwritable(format!(
                "row {index} has {} values, expected {}",
                row.len(),
                dataset.columns.len()
            )));
        }
        for (value, column) in row.iter().zip(&dataset.columns) {
            let matches = matches!(
                (value, column.column_type),
                (CellValue::Missing, _)
                    | (CellValue::Number(_), ColumnType::Number)
                    | (CellValue::Text(_), ColumnType::Character)
            );
            if !matches {
                return Err(Sas7bdatError::unwritable(format!(
                    "row {index} has a value of the wrong type for column {}",
                    column.name
                )));
            }
        }
    }
    Ok(())
}

fn encoding_code(name: Option<&str>) -> u8 {
    match name {
        Some(n) if n.eq_ignore_ascii_case("windows-1252") => ENCODING_WLATIN1,
        Some(n) if n.eq_ignore_ascii_case("ISO-8859-1") => ENCODING_LATIN1,
        _ => ENCODING_UTF8,
    }
}

fn place_columns(columns: &[Sas7bdatColumn]) -> Vec<Sas7bdatColumn> {
    let mut offset = 0;
    columns
        .iter()
        .map(|column| {
            let placed = Sas7bdatColumn {
                offset,
                ..column.clone()
            };
            offset += column.length;
            placed
        })
        .collect()
}

fn encode_row(
    row: &[CellValue],
    columns: &[Sas7bdatColumn],
    row_length: usize,
    endianness: Endianness,
    encoding: &'static Encoding,
) -> Vec<u8> {
    let mut out = vec![b' '; row_length];
    for (value, column) in row.iter().zip(columns) {
        let field = &mut out[column.offset..column.offset + column.length];
        match (value, column.column_type) {
            (CellValue::Number(v), _) => field.copy_from_slice(&encode_number(*v, field.len(), endianness)),
            (CellValue::Missing, ColumnType::Number) => {
                field.copy_from_slice(&encode_number(f64::NAN, field.len(), endianness));
            }
            (CellValue::Text(s), _) => {
                let bytes = encode_text(s, field.len(), encoding);
                field[..bytes.len()].copy_from_slice(&bytes);
            }
            (CellValue::Missing, ColumnType::Character) => {}
        }
    }
    out
}

/// Keep the most significant `len` bytes of the float.
fn encode_number(value: f64, len: usize, endianness: Endianness) -> Vec<u8> {
    let mut buf = [0u8; 8];
    put_f64(&mut buf, 0, value, endianness);
    match endianness {
        Endianness::Little => buf[8 - len..].to_vec(),
        Endianness::Big => buf[..len].to_vec(),
    }
}

/// Encode and cut to at most `len` bytes, on a character boundary for UTF-8.
fn encode_text(value: &str, len: usize, encoding: &'static Encoding) -> Vec<u8> {
    let (bytes, _, _) = encoding.encode(value);
    let mut end = bytes.len().min(len);
    if encoding == UTF_8 {
        while !value.is_char_boundary(end) {
            end -= 1;
        }
    }
    bytes[..end].to_vec()
}

fn put_signature(buf: &mut [u8], signature: u32, layout: Layout) {
    let value = if layout.int_len() == 8 && signature >> 16 == 0xFFFF {
        u64::from(signature) | 0xFFFF_FFFF_0000_0000
    } else {
        u64::from(signature)
    };
    put_uint(buf, 0, layout.int_len(), value, layout.endianness);
}

fn row_size_len(layout: Layout) -> usize {
    match layout.bitness {
        Bitness::B32 => 480,
        Bitness::B64 => 808,
    }
}

fn row_size(
    layout: Layout,
    row_length: usize,
    row_count: usize,
    column_count: usize,
    mix_page_row_count: usize,
) -> Vec<u8> {
    let l = layout.int_len();
    let e = layout.endianness;
    let mut buf = vec![0u8; row_size_len(layout)];
    put_signature(&mut buf, SIG_ROW_SIZE, layout);
    put_uint(&mut buf, ROW_LENGTH_MULTIPLIER * l, l, row_length as u64, e);
    put_uint(&mut buf, ROW_COUNT_MULTIPLIER * l, l, row_count as u64, e);
    put_uint(&mut buf, 9 * l, l, column_count as u64, e);
    put_uint(&mut buf, MIX_PAGE_ROW_COUNT_MULTIPLIER * l, l, mix_page_row_count as u64, e);
    buf
}

fn column_size(layout: Layout, column_count: usize) -> Vec<u8> {
    let l = layout.int_len();
    let mut buf = vec![0u8; 3 * l];
    put_signature(&mut buf, SIG_COLUMN_SIZE, layout);
    put_uint(&mut buf, l, l, column_count as u64, layout.endianness);
    buf
}

/// Position of a string in the text block: start and length.
type TextSpan = (u16, u16);

/// Column text, name, attribute and format/label subheaders.
fn column_metadata(
    columns: &[Sas7bdatColumn],
    layout: Layout,
    encoding: &'static Encoding,
) -> Result<Vec<Vec<u8>>> {
    let l = layout.int_len();
    let e = layout.endianness;

    let mut block = vec![0u8; TEXT_BLOCK_PREFIX];
    let mut push_text = |text: Option<&str>| -> Result<TextSpan> {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Ok((0, 0));
        };
        let (bytes, _, _) = encoding.encode(text);
        let start = u16::try_from(block.len())
            .map_err(|_| Sas7bdatError::unwritable("column text exceeds 64 KiB"))?;
        let len = u16::try_from(bytes.len())
            .map_err(|_| Sas7bdatError::unwritable("column text exceeds 64 KiB"))?;
        block.extend_from_slice(&bytes);
        block.resize(block.len().next_multiple_of(4), b' ');
        Ok((start, len))
    };

    let mut spans = Vec::with_capacity(columns.len());
    for column in columns {
        spans.push((
            push_text(Some(&column.name))?,
            push_text(column.format.as_deref())?,
            push_text(column.label.as_deref())?,
        ));
    }
    let block_size = u16::try_from(block.len())
        .map_err(|_| Sas7bdatError::unwritable("column text exceeds 64 KiB"))?;
    put_uint(&mut block, 0, 2, u64::from(block_size), e);

    let mut text = vec![0u8; (l + block.len()).next_multiple_of(8)];
    put_signature(&mut text, SIG_COLUMN_TEXT, layout);
    text[l..l + block.len()].copy_from_slice(&block);

    let n = columns.len();
    let mut names = vec![0u8; (2 * l + 12 + 8 * n).next_multiple_of(8)];
    put_signature(&mut names, SIG_COLUMN_NAME, layout);
    for (i, ((start, len), _, _)) in spans.iter().enumerate() {
        let at = l + 8 * (i + 1);
        put_uint(&mut names, at + 2, 2, u64::from(*start), e);
        put_uint(&mut names, at + 4, 2, u64::from(*len), e);
    }

    let mut attributes = vec![0u8; (2 * l + 12 + n * (l + 8)).next_multiple_of(8)];
    put_signature(&mut attributes, SIG_COLUMN_ATTRIBUTES, layout);
    for (i, column) in columns.iter().enumerate() {
        let step = i * (l + 8);
        put_uint(&mut attributes, l + 8 + step, l, column.offset as u64, e);
        put_uint(&mut attributes, 2 * l + 8 + step, 4, column.length as u64, e);
        attributes[2 * l + 14 + step] = match column.column_type {
            ColumnType::Number => 1,
            ColumnType::Character => 2,
        };
    }

    let mut subheaders = vec![text, names, attributes];
    for (_, format, label) in &spans {
        let mut buf = vec![0u8; 3 * l + 64];
        put_signature(&mut buf, SIG_FORMAT_LABEL, layout);
        let base = 3 * l;
        for (index, start, length, span) in [
            (FORMAT_INDEX_OFFSET, FORMAT_START_OFFSET, FORMAT_LENGTH_OFFSET, format),
            (LABEL_INDEX_OFFSET, LABEL_START_OFFSET, LABEL_LENGTH_OFFSET, label),
        ] {
            put_uint(&mut buf, base + index, 2, 0, e);
            put_uint(&mut buf, base + start, 2, u64::from(span.0), e);
            put_uint(&mut buf, base + length, 2, u64::from(span.1), e);
        }
        subheaders.push(buf);
    }
    Ok(subheaders)
}

fn page_header(page: &mut [u8], layout: Layout, page_type: u16, blocks: usize, subheaders: usize) {
    let at = layout.page_bit_offset();
    let e = layout.endianness;
    put_uint(page, at, 2, u64::from(page_type), e);
    put_uint(page, at + 2, 2, blocks as u64, e);
    put_uint(page, at + 4, 2, subheaders as u64, e);
}

/// Subheaders are packed from the end of the page towards the pointers.
fn metadata_page(
    layout: Layout,
    page_length: usize,
    subheaders: &[Vec<u8>],
    rows: &[Vec<u8>],
    rows_start: usize,
    mix: bool,
) -> Vec<u8> {
    let l = layout.int_len();
    let mut page = vec![0u8; page_length];
    let page_type = if mix { PAGE_MIX } else { PAGE_META };
    page_header(&mut page, layout, page_type, subheaders.len() + rows.len(), subheaders.len());

    let mut end = page_length;
    for (i, subheader) in subheaders.iter().enumerate() {
        end -= subheader.len();
        page[end..end + subheader.len()].copy_from_slice(subheader);
        let at = layout.page_bit_offset() + SUBHEADER_POINTERS_OFFSET + i * layout.pointer_len();
        put_uint(&mut page, at, l, end as u64, layout.endianness);
        put_uint(&mut page, at + l, l, subheader.len() as u64, layout.endianness);
    }

    let mut at = rows_start;
    for row in rows {
        page[at..at + row.len()].copy_from_slice(row);
        at += row.len();
    }
    page
}

fn data_page(layout: Layout, page_length: usize, rows: &[Vec<u8>]) -> Vec<u8> {
    let mut page = vec![0u8; page_length];
    page_header(&mut page, layout, PAGE_DATA, rows.len(), 0);
    let mut at = layout.page_bit_offset() + SUBHEADER_POINTERS_OFFSET;
    for row in rows {
        page[at..at + row.len()].copy_from_slice(row);
        at += row.len();
    }
    page
}
