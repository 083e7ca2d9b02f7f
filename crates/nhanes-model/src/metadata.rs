//! Column and dataset metadata carried alongside the values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage type declared by the source file.
///
/// Kept for reference only; reported column types come from
/// [`infer_type`](crate::infer_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Numeric,
    Character,
}

/// A SAS display format such as `DATE9.` or `8.2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFormat {
    /// Format name without width (`DATE`, `BEST`, `$CHAR`); empty for
    /// plain `w.d` formats.
    pub name: String,
    pub width: u16,
    pub decimals: u16,
}

impl DisplayFormat {
    #[must_use]
    pub fn new(name: impl Into<String>, width: u16, decimals: u16) -> Self {
        Self {
            name: name.into(),
            width,
            decimals,
        }
    }

    /// Build a format from parts, returning `None` when nothing was declared.
    #[must_use]
    pub fn from_parts(name: Option<&str>, width: u16, decimals: u16) -> Option<Self> {
        let name = name.map(str::trim).unwrap_or("");
        if name.is_empty() && width == 0 && decimals == 0 {
            None
        } else {
            Some(Self::new(name, width, decimals))
        }
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.width > 0 {
            write!(f, "{}", self.width)?;
        }
        f.write_str(".")?;
        if self.decimals > 0 {
            write!(f, "{}", self.decimals)?;
        }
        Ok(())
    }
}

/// Per-column metadata from the parser's metadata channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub label: Option<String>,
    pub format: Option<DisplayFormat>,
    pub storage: StorageType,
}

impl ColumnMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>, storage: StorageType) -> Self {
        Self {
            name: name.into(),
            label: None,
            format: None,
            storage,
        }
    }

    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, StorageType::Numeric)
    }

    #[must_use]
    pub fn character(name: impl Into<String>) -> Self {
        Self::new(name, StorageType::Character)
    }

    /// Set the label; blank labels are treated as absent.
    #[must_use]
    pub fn with_label(mut self, label: Option<impl Into<String>>) -> Self {
        self.label = label.map(Into::into).filter(|l| !l.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Option<DisplayFormat>) -> Self {
        self.format = format;
        self
    }
}

/// The file layout a table was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    TransportV5,
    TransportV8,
    Sas7bdat,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportV5 => write!(f, "SAS transport V5"),
            Self::TransportV8 => write!(f, "SAS transport V8"),
            Self::Sas7bdat => write!(f, "SAS7BDAT"),
        }
    }
}

/// File-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub table_name: Option<String>,
    pub file_label: Option<String>,
    pub encoding: Option<String>,
    pub format: Option<SourceFormat>,
}

impl DatasetMetadata {
    #[must_use]
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format: Some(format),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = non_blank(name.into());
        self
    }

    #[must_use]
    pub fn with_file_label(mut self, label: Option<String>) -> Self {
        self.file_label = label.and_then(non_blank);
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding.and_then(non_blank);
        self
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
