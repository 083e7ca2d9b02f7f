//! Metadata-aware SAS transport strategy.

use std::path::Path;

use nhanes_model::Table;
use nhanes_xpt::{XptReaderOptions, read_xpt_with_options};

use super::transport::xpt_table;
use super::{ParseStrategy, StrategyKind};
use crate::error::StrategyError;

/// Reads the transport layout leniently, detects the text encoding and
/// turns SAS date and datetime columns into dates.
///
/// Also the only strategy behind file descriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataStrategy;

impl ParseStrategy for MetadataStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Metadata
    }

    fn parse(&self, path: &Path) -> Result<Table, StrategyError> {
        let dataset = read_xpt_with_options(path, XptReaderOptions::lenient())
            .map_err(|e| StrategyError::new(self.name(), e))?;
        let mut table = xpt_table(dataset).map_err(|e| StrategyError::new(self.name(), e))?;
        table.apply_temporal_formats();
        Ok(table)
    }
}
