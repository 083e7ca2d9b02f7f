//! In-memory form of one transport member plus reader and writer options.

mod column;
mod dataset;
mod missing;
mod options;
mod value;

pub use column::{Justification, XptColumn, XptType};
pub use dataset::XptDataset;
pub use missing::MissingValue;
pub use options::{TextEncoding, XptReaderOptions, XptVersion, XptWriterOptions};
pub use value::{NumericValue, XptValue};
