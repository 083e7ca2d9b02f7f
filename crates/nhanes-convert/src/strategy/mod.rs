//! Parsing strategies and the ordered fallback chain.
//!
//! Each strategy turns a file into a [`Table`] or explains why it could not.
//! [`StrategyChain`] tries them in priority order and stops at the first
//! success.

mod chain;
mod legacy;
mod metadata;
mod transport;

use std::fmt;
use std::path::Path;

use nhanes_model::Table;

use crate::error::StrategyError;

pub use chain::{ChainFailure, ChainSuccess, StrategyChain};
pub use legacy::LegacyStrategy;
pub use metadata::MetadataStrategy;
pub use transport::TransportStrategy;

/// The reader family behind a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Strict SAS transport reader.
    Transport,
    /// Lenient SAS transport reader with encoding detection and dates.
    Metadata,
    /// SAS7BDAT reader.
    Legacy,
}

impl StrategyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Metadata => "metadata",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way of parsing a file into a table.
pub trait ParseStrategy {
    /// Name used in logs and aggregated error messages.
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    fn kind(&self) -> StrategyKind;

    fn parse(&self, path: &Path) -> Result<Table, StrategyError>;
}
