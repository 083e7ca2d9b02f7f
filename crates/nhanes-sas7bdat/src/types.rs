//! Dataset, column and layout types.

use chrono::NaiveDateTime;

/// Integer width of the writing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bitness {
    B32,
    #[default]
    B64,
}

/// Byte order of integers and floats in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Platform layout: everything that changes offsets and byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    pub bitness: Bitness,
    pub endianness: Endianness,
}

impl Layout {
    #[must_use]
    pub const fn new(bitness: Bitness, endianness: Endianness) -> Self {
        Self {
            bitness,
            endianness,
        }
    }

    /// Width of integers in headers and subheaders.
    #[must_use]
    pub const fn int_len(self) -> usize {
        match self.bitness {
            Bitness::B32 => 4,
            Bitness::B64 => 8,
        }
    }

    /// Offset of the page header within each page.
    #[must_use]
    pub const fn page_bit_offset(self) -> usize {
        match self.bitness {
            Bitness::B32 => 16,
            Bitness::B64 => 32,
        }
    }

    /// Size of one subheader pointer.
    #[must_use]
    pub const fn pointer_len(self) -> usize {
        match self.bitness {
            Bitness::B32 => 12,
            Bitness::B64 => 24,
        }
    }
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Number,
    Character,
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sas7bdatColumn {
    pub name: String,
    pub label: Option<String>,
    /// Display format name, e.g. `DATE` or `BEST`.
    pub format: Option<String>,
    pub column_type: ColumnType,
    /// Byte offset within a row.
    pub offset: usize,
    /// Byte width within a row.
    pub length: usize,
}

impl Sas7bdatColumn {
    /// An 8-byte numeric column.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            format: None,
            column_type: ColumnType::Number,
            offset: 0,
            length: 8,
        }
    }

    /// A character column of the given width.
    #[must_use]
    pub fn character(name: impl Into<String>, length: usize) -> Self {
        Self {
            column_type: ColumnType::Character,
            length,
            ..Self::numeric(name)
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// One cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// A numeric missing value (stored as NaN).
    Missing,
    Number(f64),
    Text(String),
}

/// A dataset read from (or to be written to) a SAS7BDAT file.
#[derive(Debug, Clone, PartialEq)]
pub struct Sas7bdatDataset {
    pub name: String,
    /// Encoding declared in the header, when recognised.
    pub encoding: Option<String>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    pub layout: Layout,
    pub columns: Vec<Sas7bdatColumn>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sas7bdatDataset {
    /// An empty dataset with the given columns and the default layout.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<Sas7bdatColumn>) -> Self {
        Self {
            name: name.into(),
            encoding: None,
            created: None,
            modified: None,
            layout: Layout::default(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Values of one column, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}
