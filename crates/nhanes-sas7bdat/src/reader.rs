//! SAS7BDAT reader.
//!
//! The file is a header followed by fixed-size pages. Metadata pages hold
//! subheaders (row size, column names, attributes, formats and labels),
//! data pages hold rows, and mix pages hold both. Reading makes two passes:
//! one collecting metadata from every page, one collecting rows.

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;

use crate::bytes::{ByteView, decode_number};
use crate::constants::{
    COMPRESSION_MARKERS, FORMAT_INDEX_OFFSET, FORMAT_LENGTH_OFFSET, FORMAT_START_OFFSET,
    LABEL_INDEX_OFFSET, LABEL_LENGTH_OFFSET, LABEL_START_OFFSET, MIX_PAGE_ROW_COUNT_MULTIPLIER,
    PAGE_AMD, PAGE_COMP, PAGE_DATA, PAGE_META, PAGE_METC, PAGE_MIX, PAGE_MIX_ALT,
    POINTER_COMPRESSED, POINTER_TRUNCATED, ROW_COUNT_MULTIPLIER, ROW_LENGTH_MULTIPLIER,
    SIG_COLUMN_ATTRIBUTES, SIG_COLUMN_LIST, SIG_COLUMN_NAME, SIG_COLUMN_SIZE, SIG_COLUMN_TEXT,
    SIG_COUNTS, SIG_FORMAT_LABEL, SIG_ROW_SIZE, SUBHEADER_POINTERS_OFFSET,
};
use crate::error::{Result, Sas7bdatError};
use crate::header::Header;
use crate::types::{CellValue, ColumnType, Layout, Sas7bdatColumn, Sas7bdatDataset};

/// Read a SAS7BDAT file.
pub fn read_sas7bdat(path: &Path) -> Result<Sas7bdatDataset> {
    let data = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Sas7bdatError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Sas7bdatError::Io(e)
        }
    })?;
    read_sas7bdat_bytes(&data)
}

/// Read a SAS7BDAT file already held in memory.
pub fn read_sas7bdat_bytes(data: &[u8]) -> Result<Sas7bdatDataset> {
    let header = Header::parse(data)?;
    let pages = split_pages(data, &header)?;
    let encoding = header.text_encoding();

    let mut metadata = Metadata::default();
    for (index, page) in pages.iter().enumerate() {
        let page = Page::new(page, index, header.layout)?;
        if page.kind.has_subheaders() {
            for pointer in page.pointers()? {
                metadata.absorb(&page, &pointer)?;
            }
        }
    }

    if metadata
        .text_blocks
        .first()
        .is_some_and(|block| COMPRESSION_MARKERS.iter().any(|m| contains(block, m)))
    {
        return Err(Sas7bdatError::Compressed);
    }

    let row_size = metadata
        .row_size
        .ok_or(Sas7bdatError::MissingMetadata("row size"))?;
    let columns = metadata.columns(encoding, row_size.row_length)?;
    let rows = read_rows(&pages, &header, &columns, row_size, encoding)?;

    Ok(Sas7bdatDataset {
        name: header.dataset_name.clone(),
        encoding: header.encoding_name().map(str::to_string),
        created: header.created,
        modified: header.modified,
        layout: header.layout,
        columns,
        rows,
    })
}

fn split_pages<'a>(data: &'a [u8], header: &Header) -> Result<Vec<&'a [u8]>> {
    let body = data
        .get(header.header_length..)
        .ok_or(Sas7bdatError::Truncated {
            offset: header.header_length,
        })?;
    let available = body.len() / header.page_length;
    if available < header.page_count {
        return Err(Sas7bdatError::Truncated { offset: data.len() });
    }
    Ok(body
        .chunks_exact(header.page_length)
        .take(header.page_count)
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    Meta,
    Data,
    Mix,
    Amd,
    Compressed,
    Other,
}

impl PageKind {
    fn from_type(page_type: u16) -> Self {
        match page_type {
            PAGE_META | PAGE_METC => Self::Meta,
            PAGE_DATA => Self::Data,
            PAGE_MIX | PAGE_MIX_ALT => Self::Mix,
            PAGE_AMD => Self::Amd,
            PAGE_COMP => Self::Compressed,
            _ => Self::Other,
        }
    }

    fn has_subheaders(self) -> bool {
        matches!(self, Self::Meta | Self::Mix | Self::Amd)
    }
}

struct Page<'a> {
    view: ByteView<'a>,
    index: usize,
    layout: Layout,
    kind: PageKind,
    block_count: usize,
    subheader_count: usize,
}

impl<'a> Page<'a> {
    fn new(data: &'a [u8], index: usize, layout: Layout) -> Result<Self> {
        let view = ByteView::new(data, layout.endianness);
        let bit_offset = layout.page_bit_offset();
        let page_type = view.u16(bit_offset)? as u16;
        Ok(Self {
            view,
            index,
            layout,
            kind: PageKind::from_type(page_type),
            block_count: view.u16(bit_offset + 2)?,
            subheader_count: view.u16(bit_offset + 4)?,
        })
    }

    fn pointers(&self) -> Result<Vec<Pointer>> {
        let int_len = self.layout.int_len();
        let start = self.layout.page_bit_offset() + SUBHEADER_POINTERS_OFFSET;
        (0..self.subheader_count)
            .map(|i| {
                let at = start + i * self.layout.pointer_len();
                Ok(Pointer {
                    offset: self.view.usize(at, int_len)?,
                    length: self.view.usize(at + int_len, int_len)?,
                    compression: self.view.uint(at + 2 * int_len, 1)? as u8,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Sas7bdatError::page(self.index, e.to_string()))
    }

    /// Offset of the first row on a mix page, after the pointers and
    /// alignment to 8 bytes.
    fn mix_rows_offset(&self) -> usize {
        let end = self.layout.page_bit_offset()
            + SUBHEADER_POINTERS_OFFSET
            + self.subheader_count * self.layout.pointer_len();
        end + end % 8
    }
}

struct Pointer {
    offset: usize,
    length: usize,
    compression: u8,
}

#[derive(Debug, Clone, Copy)]
struct RowSize {
    row_length: usize,
    row_count: usize,
    mix_page_row_count: usize,
}

/// Location of a string inside a column text block.
#[derive(Debug, Clone, Copy)]
struct TextRef {
    block: usize,
    start: usize,
    len: usize,
}

#[derive(Debug, Clone, Copy)]
struct Attributes {
    offset: usize,
    length: usize,
    column_type: ColumnType,
}

#[derive(Default)]
struct Metadata {
    row_size: Option<RowSize>,
    column_count: Option<usize>,
    text_blocks: Vec<Vec<u8>>,
    names: Vec<TextRef>,
    attributes: Vec<Attributes>,
    formats: Vec<(TextRef, TextRef)>,
}

impl Metadata {
    fn absorb(&mut self, page: &Page<'_>, pointer: &Pointer) -> Result<()> {
        if pointer.length == 0 || pointer.compression == POINTER_TRUNCATED {
            return Ok(());
        }
        if pointer.compression == POINTER_COMPRESSED {
            return Err(Sas7bdatError::Compressed);
        }

        let view = page.view;
        let l = page.layout.int_len();
        let off = pointer.offset;
        let len = pointer.length;
        view.slice(off, len)
            .map_err(|_| Sas7bdatError::page(page.index, "subheader outside page"))?;

        // Low 32 bits of an integer-width signature.
        let signature = view.uint(off, l)? as u32;
        match signature {
            SIG_ROW_SIZE => {
                self.row_size = Some(RowSize {
                    row_length: view.usize(off + ROW_LENGTH_MULTIPLIER * l, l)?,
                    row_count: view.usize(off + ROW_COUNT_MULTIPLIER * l, l)?,
                    mix_page_row_count: view.usize(off + MIX_PAGE_ROW_COUNT_MULTIPLIER * l, l)?,
                });
            }
            SIG_COLUMN_SIZE => {
                self.column_count = Some(view.usize(off + l, l)?);
            }
            SIG_COLUMN_TEXT => {
                let size = view.u16(off + l)?;
                self.text_blocks.push(view.slice(off + l, size)?.to_vec());
            }
            SIG_COLUMN_NAME => {
                let count = len.saturating_sub(2 * l + 12) / 8;
                for i in 0..count {
                    let at = off + l + 8 * (i + 1);
                    self.names.push(TextRef {
                        block: view.u16(at)?,
                        start: view.u16(at + 2)?,
                        len: view.u16(at + 4)?,
                    });
                }
            }
            SIG_COLUMN_ATTRIBUTES => {
                let count = len.saturating_sub(2 * l + 12) / (l + 8);
                for i in 0..count {
                    let step = i * (l + 8);
                    let column_type = if view.uint(off + 2 * l + 14 + step, 1)? == 1 {
                        ColumnType::Number
                    } else {
                        ColumnType::Character
                    };
                    self.attributes.push(Attributes {
                        offset: view.usize(off + l + 8 + step, l)?,
                        length: view.usize(off + 2 * l + 8 + step, 4)?,
                        column_type,
                    });
                }
            }
            SIG_FORMAT_LABEL => {
                let base = off + 3 * l;
                let text_ref = |index: usize, start: usize, length: usize| -> Result<TextRef> {
                    Ok(TextRef {
                        block: view.u16(base + index)?,
                        start: view.u16(base + start)?,
                        len: view.u16(base + length)?,
                    })
                };
                self.formats.push((
                    text_ref(FORMAT_INDEX_OFFSET, FORMAT_START_OFFSET, FORMAT_LENGTH_OFFSET)?,
                    text_ref(LABEL_INDEX_OFFSET, LABEL_START_OFFSET, LABEL_LENGTH_OFFSET)?,
                ));
            }
            SIG_COUNTS | SIG_COLUMN_LIST => {}
            _ => {}
        }
        Ok(())
    }

    fn text(&self, text: TextRef, encoding: &'static Encoding) -> Option<String> {
        if text.len == 0 {
            return None;
        }
        let bytes = self
            .text_blocks
            .get(text.block)?
            .get(text.start..text.start.checked_add(text.len)?)?;
        let (decoded, _) = encoding.decode_without_bom_handling(bytes);
        let trimmed = decoded.trim_end_matches([' ', '\0']).trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn columns(&self, encoding: &'static Encoding, row_length: usize) -> Result<Vec<Sas7bdatColumn>> {
        let count = self.column_count.unwrap_or(self.names.len());
        if self.names.len() < count {
            return Err(Sas7bdatError::MissingMetadata("column name"));
        }
        if self.attributes.len() < count {
            return Err(Sas7bdatError::MissingMetadata("column attributes"));
        }

        (0..count)
            .map(|i| {
                let name = self
                    .text(self.names[i], encoding)
                    .ok_or_else(|| Sas7bdatError::subheader(format!("column {i} has no name")))?;
                let attributes = self.attributes[i];
                let end = attributes.offset.checked_add(attributes.length);
                if end.is_none_or(|end| end > row_length) {
                    return Err(Sas7bdatError::ColumnOutOfBounds { name, row_length });
                }
                let (format, label) = self.formats.get(i).map_or((None, None), |&(f, l)| {
                    (self.text(f, encoding), self.text(l, encoding))
                });
                Ok(Sas7bdatColumn {
                    name,
                    label,
                    format,
                    column_type: attributes.column_type,
                    offset: attributes.offset,
                    length: attributes.length,
                })
            })
            .collect()
    }
}

fn read_rows(
    pages: &[&[u8]],
    header: &Header,
    columns: &[Sas7bdatColumn],
    row_size: RowSize,
    encoding: &'static Encoding,
) -> Result<Vec<Vec<CellValue>>> {
    let RowSize {
        row_length,
        row_count,
        mix_page_row_count,
    } = row_size;
    if row_length == 0 {
        return Ok(Vec::new());
    }
    // A corrupt count must not drive the allocation.
    let available: usize = pages.iter().map(|page| page.len()).sum();
    let mut rows = Vec::with_capacity(row_count.min(available / row_length));

    for (index, data) in pages.iter().enumerate() {
        if rows.len() >= row_count {
            break;
        }
        let page = Page::new(data, index, header.layout)?;
        let (start, on_page) = match page.kind {
            PageKind::Data => (
                header.layout.page_bit_offset() + SUBHEADER_POINTERS_OFFSET,
                page.block_count,
            ),
            PageKind::Mix => (page.mix_rows_offset(), mix_page_row_count),
            PageKind::Compressed => return Err(Sas7bdatError::Compressed),
            PageKind::Meta | PageKind::Amd | PageKind::Other => continue,
        };

        let take = on_page.min(row_count - rows.len());
        for r in 0..take {
            let row = r
                .checked_mul(row_length)
                .and_then(|offset| offset.checked_add(start))
                .and_then(|offset| page.view.slice(offset, row_length).ok())
                .ok_or_else(|| Sas7bdatError::page(index, "row outside page"))?;
            rows.push(decode_row(row, columns, header, encoding));
        }
    }

    if rows.len() < row_count {
        return Err(Sas7bdatError::header(format!(
            "expected {row_count} rows, found {}",
            rows.len()
        )));
    }
    Ok(rows)
}

fn decode_row(
    row: &[u8],
    columns: &[Sas7bdatColumn],
    header: &Header,
    encoding: &'static Encoding,
) -> Vec<CellValue> {
    columns
        .iter()
        .map(|column| {
            let bytes = &row[column.offset..column.offset + column.length];
            match column.column_type {
                ColumnType::Number => {
                    let value = decode_number(bytes, header.layout.endianness);
                    if value.is_nan() {
                        CellValue::Missing
                    } else {
                        CellValue::Number(value)
                    }
                }
                ColumnType::Character => {
                    let (text, _) = encoding.decode_without_bom_handling(bytes);
                    CellValue::Text(text.trim_end_matches([' ', '\0']).to_string())
                }
            }
        })
        .collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_kinds() {
        assert_eq!(PageKind::from_type(0), PageKind::Meta);
        assert_eq!(PageKind::from_type(16384), PageKind::Meta);
        assert_eq!(PageKind::from_type(256), PageKind::Data);
        assert_eq!(PageKind::from_type(640), PageKind::Mix);
        assert_eq!(PageKind::from_type(0x9000), PageKind::Compressed);
        assert!(PageKind::Amd.has_subheaders());
        assert!(!PageKind::Data.has_subheaders());
    }

    #[test]
    fn test_contains() {
        assert!(contains(b"....SASYZCRL....", b"SASYZCRL"));
        assert!(!contains(b"SASYZCR", b"SASYZCRL"));
    }

    #[test]
    fn test_not_sas7bdat() {
        assert!(matches!(
            read_sas7bdat_bytes(b"<html><body>Not Found</body></html>"),
            Err(Sas7bdatError::NotSas7bdat)
        ));
    }
}
