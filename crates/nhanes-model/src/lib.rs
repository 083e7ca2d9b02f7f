//! Tabular model shared by every reader in the converter.
//!
//! Readers produce a [`Table`]: named columns of realized [`Value`]s plus
//! per-column and per-dataset metadata. Column types are never taken from
//! the source file's declarations; they are inferred from the values with
//! [`infer_type`], so every reader reports the same type for the same data.
//!
//! # Example
//!
//! ```
//! use nhanes_model::{Column, ColumnMetadata, DatasetMetadata, InferredType, Table, Value};
//!
//! let seqn = Column::new(
//!     ColumnMetadata::numeric("SEQN"),
//!     vec![Value::Number(93703.0), Value::Number(93704.0)],
//! );
//! let table = Table::new(vec![seqn], DatasetMetadata::default()).unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.columns()[0].inferred_type(), InferredType::Integer);
//! ```

pub mod error;
pub mod inference;
pub mod metadata;
pub mod table;
pub mod temporal;
pub mod value;

pub use error::{ModelError, Result};
pub use inference::{InferredType, infer_type};
pub use metadata::{ColumnMetadata, DatasetMetadata, DisplayFormat, SourceFormat, StorageType};
pub use table::{Column, Table};
pub use temporal::{TemporalKind, sas_date, sas_datetime, temporal_kind};
pub use value::{Value, format_number};
