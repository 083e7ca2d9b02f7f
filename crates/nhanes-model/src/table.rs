//! Columnar table produced by every reader.

use crate::error::{ModelError, Result};
use crate::inference::{InferredType, infer_type};
use crate::metadata::{ColumnMetadata, DatasetMetadata};
use crate::temporal::temporal_kind;
use crate::value::Value;

/// One named column and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub metadata: ColumnMetadata,
    pub values: Vec<Value>,
}

impl Column {
    #[must_use]
    pub fn new(metadata: ColumnMetadata, values: Vec<Value>) -> Self {
        Self { metadata, values }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.metadata.label.as_deref()
    }

    /// Type inferred from the realized values.
    #[must_use]
    pub fn inferred_type(&self) -> InferredType {
        infer_type(&self.values)
    }

    /// Turn SAS day or second counts into dates when the column carries a
    /// date or datetime display format.
    pub fn apply_temporal_format(&mut self) {
        let Some(kind) = self
            .metadata
            .format
            .as_ref()
            .and_then(|f| temporal_kind(&f.name))
        else {
            return;
        };
        for value in &mut self.values {
            *value = kind.convert(std::mem::replace(value, Value::Missing));
        }
    }
}

/// Ordered columns of equal length plus dataset metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
    metadata: DatasetMetadata,
}

impl Table {
    /// Assemble a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>, metadata: DatasetMetadata) -> Result<Self> {
        let row_count = columns.first().map_or(0, |c| c.values.len());
        if let Some(bad) = columns.iter().find(|c| c.values.len() != row_count) {
            return Err(ModelError::ColumnLengthMismatch {
                column: bad.name().to_string(),
                expected: row_count,
                actual: bad.values.len(),
            });
        }
        Ok(Self {
            columns,
            row_count,
            metadata,
        })
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.columns.iter().filter_map(move |c| c.values.get(index))
    }

    /// Rows in order, each as a vector of references.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> {
        (0..self.row_count).map(|i| self.row(i).collect())
    }

    /// Apply [`Column::apply_temporal_format`] to every column.
    pub fn apply_temporal_formats(&mut self) {
        self.columns
            .iter_mut()
            .for_each(Column::apply_temporal_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DisplayFormat, SourceFormat};
    use chrono::NaiveDate;

    fn sample() -> Table {
        let columns = vec![
            Column::new(
                ColumnMetadata::numeric("SEQN"),
                vec![Value::Number(1.0), Value::Number(2.0)],
            ),
            Column::new(
                ColumnMetadata::character("RIAGENDR").with_label(Some("Gender")),
                vec![Value::from("Male"), Value::Missing],
            ),
        ];
        Table::new(columns, DatasetMetadata::new(SourceFormat::TransportV5)).unwrap()
    }

    #[test]
    fn test_accessors() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["SEQN", "RIAGENDR"]);
        assert_eq!(table.columns()[1].label(), Some("Gender"));

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![&Value::Number(1.0), &Value::from("Male")]);
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let columns = vec![
            Column::new(ColumnMetadata::numeric("A"), vec![Value::Number(1.0)]),
            Column::new(ColumnMetadata::numeric("B"), vec![]),
        ];
        let err = Table::new(columns, DatasetMetadata::default()).unwrap_err();
        assert_eq!(
            err,
            ModelError::ColumnLengthMismatch {
                column: "B".to_string(),
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(Vec::new(), DatasetMetadata::default()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.rows().count(), 0);
    }

    #[test]
    fn test_apply_temporal_formats() {
        let columns = vec![Column::new(
            ColumnMetadata::numeric("EXAMDATE")
                .with_format(Some(DisplayFormat::new("DATE", 9, 0))),
            vec![Value::Number(21185.0), Value::Missing],
        )];
        let mut table = Table::new(columns, DatasetMetadata::default()).unwrap();
        table.apply_temporal_formats();

        let column = &table.columns()[0];
        assert_eq!(
            column.values[0],
            Value::Date(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap())
        );
        assert_eq!(column.values[1], Value::Missing);
        assert_eq!(column.inferred_type(), InferredType::Date);
    }
}
