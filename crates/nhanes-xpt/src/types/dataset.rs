//! Dataset (member) representation.

use super::{XptColumn, XptValue, XptVersion};

/// One dataset (member) of a transport file.
#[derive(Debug, Clone, PartialEq)]
pub struct XptDataset {
    /// Dataset name from the member data record.
    pub name: String,
    /// Dataset label.
    pub label: Option<String>,
    /// Dataset type (usually empty or `DATA`).
    pub dataset_type: Option<String>,
    /// Variables in observation order.
    pub columns: Vec<XptColumn>,
    /// Observations, one value per column.
    pub rows: Vec<Vec<XptValue>>,
    /// Layout version the dataset was read from.
    pub version: XptVersion,
    /// Character encoding of text fields, when the reader determined one.
    pub encoding: Option<String>,
}

impl XptDataset {
    /// Create an empty dataset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            dataset_type: None,
            columns: Vec::new(),
            rows: Vec::new(),
            version: XptVersion::V5,
            encoding: None,
        }
    }

    /// Create a dataset with the given columns and no rows.
    #[must_use]
    pub fn with_columns(name: impl Into<String>, columns: Vec<XptColumn>) -> Self {
        Self {
            columns,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, dataset_type: impl Into<String>) -> Self {
        self.dataset_type = Some(dataset_type.into());
        self
    }

    /// Append an observation.
    pub fn add_row(&mut self, row: Vec<XptValue>) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&XptColumn> {
        self.columns
            .iter()
            .find(|col| col.name.eq_ignore_ascii_case(name))
    }

    /// Values of one column, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &XptValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Total bytes of one observation.
    #[must_use]
    pub fn observation_length(&self) -> usize {
        self.columns.iter().map(|c| c.length as usize).sum()
    }
}
