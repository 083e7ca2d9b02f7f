//! SAS7BDAT strategy.

use std::path::Path;

use nhanes_model::{
    Column, ColumnMetadata, DatasetMetadata, DisplayFormat, SourceFormat, StorageType, Table,
    Value,
};
use nhanes_sas7bdat::{CellValue, ColumnType, Sas7bdatColumn, Sas7bdatDataset, read_sas7bdat};

use super::{ParseStrategy, StrategyKind};
use crate::error::StrategyError;

/// Reads uncompressed SAS7BDAT files, whatever their extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyStrategy;

impl ParseStrategy for LegacyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Legacy
    }

    fn parse(&self, path: &Path) -> Result<Table, StrategyError> {
        let dataset = read_sas7bdat(path).map_err(|e| StrategyError::new(self.name(), e))?;
        let mut table = sas7bdat_table(dataset).map_err(|e| StrategyError::new(self.name(), e))?;
        table.apply_temporal_formats();
        Ok(table)
    }
}

fn sas7bdat_table(dataset: Sas7bdatDataset) -> nhanes_model::Result<Table> {
    let metadata = DatasetMetadata::new(SourceFormat::Sas7bdat)
        .with_table_name(dataset.name)
        .with_encoding(dataset.encoding);

    let mut values: Vec<Vec<Value>> = dataset
        .columns
        .iter()
        .map(|_| Vec::with_capacity(dataset.rows.len()))
        .collect();
    for row in dataset.rows {
        for (slot, cell) in values.iter_mut().zip(row) {
            slot.push(match cell {
                CellValue::Missing => Value::Missing,
                CellValue::Number(v) => Value::from(v),
                CellValue::Text(text) => Value::Text(text),
            });
        }
    }

    let columns = dataset
        .columns
        .iter()
        .zip(values)
        .map(|(column, values)| Column::new(column_metadata(column), values))
        .collect();
    Table::new(columns, metadata)
}

fn column_metadata(column: &Sas7bdatColumn) -> ColumnMetadata {
    let storage = match column.column_type {
        ColumnType::Number => StorageType::Numeric,
        ColumnType::Character => StorageType::Character,
    };
    ColumnMetadata::new(column.name.clone(), storage)
        .with_label(column.label.clone())
        .with_format(DisplayFormat::from_parts(column.format.as_deref(), 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nhanes_model::InferredType;
    use nhanes_sas7bdat::{WriterOptions, write_sas7bdat};

    #[test]
    fn test_reads_sas7bdat() {
        let dir = tempfile::tempdir().unwrap();
        // Older survey cycles shipped SAS7BDAT files under an .xpt name
        let path = dir.path().join("L10_C.xpt");
        let mut dataset = Sas7bdatDataset::new(
            "L10_C",
            vec![
                Sas7bdatColumn::numeric("SEQN"),
                Sas7bdatColumn::numeric("LBXGH").with_label("Glycohemoglobin (%)"),
                Sas7bdatColumn::numeric("LBDDT").with_format("MMDDYY"),
                Sas7bdatColumn::character("LBDFLAG", 1),
            ],
        );
        dataset.add_row(vec![
            CellValue::Number(21005.0),
            CellValue::Number(5.4),
            CellValue::Number(0.0),
            CellValue::Text("A".to_string()),
        ]);
        write_sas7bdat(&path, &dataset, &WriterOptions::default()).unwrap();

        let table = LegacyStrategy.parse(&path).unwrap();
        assert_eq!(table.metadata().format, Some(SourceFormat::Sas7bdat));
        assert_eq!(table.metadata().table_name.as_deref(), Some("L10_C"));

        let columns = table.columns();
        assert_eq!(columns[1].label(), Some("Glycohemoglobin (%)"));
        assert_eq!(columns[1].inferred_type(), InferredType::Float);
        assert_eq!(
            columns[2].values,
            [Value::Date(NaiveDate::from_ymd_opt(1960, 1, 1).unwrap())]
        );
        assert_eq!(columns[3].inferred_type(), InferredType::Text);
    }

    #[test]
    fn test_rejects_transport_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DEMO_J.xpt");
        nhanes_xpt::write_xpt(&path, &nhanes_xpt::XptDataset::new("DEMO_J")).unwrap();

        let err = LegacyStrategy.parse(&path).unwrap_err();
        assert_eq!(err.strategy, "legacy");
        assert_eq!(err.message, "not a SAS7BDAT file");
    }
}
