//! SAS7BDAT dataset reader.
//!
//! Reads uncompressed SAS7BDAT files written on 32- or 64-bit platforms in
//! either byte order. Compressed (RLE/RDC) files are rejected with
//! [`Sas7bdatError::Compressed`].
//!
//! A small writer produces valid uncompressed files for tests and tooling.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use nhanes_sas7bdat::read_sas7bdat;
//!
//! let dataset = read_sas7bdat(Path::new("demo.sas7bdat")).unwrap();
//! for column in &dataset.columns {
//!     println!("{} ({:?})", column.name, column.column_type);
//! }
//! ```

mod bytes;
mod constants;
mod error;
mod header;
mod reader;
mod types;
mod writer;

pub use error::{Result, Sas7bdatError};
pub use header::Header;
pub use reader::{read_sas7bdat, read_sas7bdat_bytes};
pub use types::{
    Bitness, CellValue, ColumnType, Endianness, Layout, Sas7bdatColumn, Sas7bdatDataset,
};
pub use writer::{WriterOptions, write_sas7bdat, write_sas7bdat_bytes};

/// The 32-byte signature at the start of every SAS7BDAT file.
pub use constants::MAGIC;
