//! SAS Transport (XPORT) file format reader and writer.
//!
//! Survey agencies publish their public-use data as SAS Transport files.
//! This crate reads both the V5 layout (8-character names, 40-character
//! labels) and the V8 layout (long names, LABELV8/LABELV9 sections), and can
//! write either layout for tooling and fixtures.
//!
//! # Features
//!
//! - Auto-detection of V5 and V8 headers
//! - IBM mainframe ↔ IEEE floating-point conversion
//! - All 28 SAS missing value codes (`.`, `._`, `.A`-`.Z`)
//! - Strict reading (exact record layout) and lenient reading (padded
//!   records, partial trailing observations, encoding detection)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use nhanes_xpt::{XptReaderOptions, read_xpt, read_xpt_with_options};
//!
//! let dataset = read_xpt(Path::new("DEMO_J.xpt")).unwrap();
//! println!("{} ({} rows)", dataset.name, dataset.num_rows());
//!
//! // Tolerate truncated downloads and detect the text encoding
//! let dataset =
//!     read_xpt_with_options(Path::new("DEMO_J.xpt"), XptReaderOptions::lenient()).unwrap();
//! println!("encoding: {:?}", dataset.encoding);
//! ```
//!
//! # Missing Values
//!
//! ```
//! use nhanes_xpt::{MissingValue, XptValue};
//!
//! let missing = XptValue::numeric_missing();
//! let refused = XptValue::numeric_missing_with(MissingValue::Special('R'));
//!
//! assert!(missing.is_missing());
//! assert!(refused.is_missing());
//! ```

mod error;
pub mod float;
pub mod header;
mod reader;
mod types;
mod writer;

pub use error::{NameKind, Result, XptError};

pub use types::{
    Justification, MissingValue, NumericValue, TextEncoding, XptColumn, XptDataset,
    XptReaderOptions, XptType, XptValue, XptVersion, XptWriterOptions,
};

pub use reader::{XptReader, detect_encoding, read_xpt, read_xpt_bytes, read_xpt_with_options};

pub use writer::{XptWriter, write_xpt, write_xpt_with_options};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
