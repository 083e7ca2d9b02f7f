//! Survey transport file conversion.
//!
//! Turns SAS transport files into CSV tables and plain-text descriptions.
//! Every file goes through an ordered [`StrategyChain`]: the strict transport
//! reader first, then the lenient metadata reader, then the SAS7BDAT reader.
//! The first success wins; if all fail, the file is reported with every
//! strategy's reason and the batch moves on.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use nhanes_convert::{BatchMode, ConvertOptions, run_batch};
//!
//! let options = ConvertOptions::default().with_output_dir("csv");
//! let report = run_batch(Path::new("downloads/xpt_files"), BatchMode::Convert, &options)?;
//! println!("{}", report.summary());
//! # Ok::<(), nhanes_convert::ConvertError>(())
//! ```

mod batch;
mod convert;
mod describe;
mod discovery;
mod error;
mod sink;
mod sniff;
mod source;
pub mod strategy;

// === Error Types ===
pub use error::{ConvertError, Result, StrategyError};

// === Single Files ===
pub use convert::{ConversionOutcome, Converted, ParseFailure, convert_file, csv_path};
pub use describe::{Description, PREVIEW_ROWS, describe_file, describe_with, render_description};
pub use sink::{write_atomic, write_csv, write_text};
pub use sniff::{FileSignature, SNIFF_LEN, classify, sniff};
pub use source::SourceFile;
pub use strategy::{
    ChainFailure, ChainSuccess, LegacyStrategy, MetadataStrategy, ParseStrategy, StrategyChain,
    StrategyKind, TransportStrategy,
};

// === Batches ===
pub use batch::{
    BatchMode, BatchReport, ConvertOptions, FileReport, Step, StepResult, run_batch,
    run_batch_with_chain,
};
pub use discovery::{DEFAULT_EXTENSION, list_input_files};
