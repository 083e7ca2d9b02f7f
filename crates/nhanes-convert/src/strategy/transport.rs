//! Strict SAS transport strategy.

use std::path::Path;

use nhanes_model::{
    Column, ColumnMetadata, DatasetMetadata, DisplayFormat, SourceFormat, StorageType, Table,
    Value,
};
use nhanes_xpt::{NumericValue, XptColumn, XptDataset, XptValue, XptVersion, read_xpt};

use super::{ParseStrategy, StrategyKind};
use crate::error::StrategyError;

/// Reads the exact transport layout and decodes text as lossy UTF-8.
///
/// Numbers stay numbers even under a date format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportStrategy;

impl ParseStrategy for TransportStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Transport
    }

    fn parse(&self, path: &Path) -> Result<Table, StrategyError> {
        let dataset = read_xpt(path).map_err(|e| StrategyError::new(self.name(), e))?;
        xpt_table(dataset).map_err(|e| StrategyError::new(self.name(), e))
    }
}

/// Move a transport dataset into the shared table model.
pub(super) fn xpt_table(dataset: XptDataset) -> nhanes_model::Result<Table> {
    let XptDataset {
        name,
        label,
        columns,
        rows,
        version,
        encoding,
        ..
    } = dataset;

    let format = match version {
        XptVersion::V5 => SourceFormat::TransportV5,
        XptVersion::V8 => SourceFormat::TransportV8,
    };
    let metadata = DatasetMetadata::new(format)
        .with_table_name(name)
        .with_file_label(label)
        .with_encoding(encoding);

    let mut values: Vec<Vec<Value>> = columns
        .iter()
        .map(|_| Vec::with_capacity(rows.len()))
        .collect();
    for row in rows {
        for (slot, value) in values.iter_mut().zip(row) {
            slot.push(xpt_value(value));
        }
    }

    let columns = columns
        .iter()
        .zip(values)
        .map(|(column, values)| Column::new(column_metadata(column), values))
        .collect();
    Table::new(columns, metadata)
}

fn column_metadata(column: &XptColumn) -> ColumnMetadata {
    let storage = if column.is_numeric() {
        StorageType::Numeric
    } else {
        StorageType::Character
    };
    ColumnMetadata::new(column.name.clone(), storage)
        .with_label(column.label.clone())
        .with_format(DisplayFormat::from_parts(
            column.format.as_deref(),
            column.format_length,
            column.format_decimals,
        ))
}

fn xpt_value(value: XptValue) -> Value {
    match value {
        XptValue::Char(text) => Value::Text(text),
        XptValue::Num(NumericValue::Value(v)) => Value::from(v),
        XptValue::Num(NumericValue::Missing(_)) => Value::Missing,
    }
}
