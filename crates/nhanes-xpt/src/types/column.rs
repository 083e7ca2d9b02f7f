//! Variable (column) definitions.

use std::fmt;

/// Storage type of an XPT variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XptType {
    /// Numeric (IBM float, 2-8 bytes).
    Num,
    /// Character (fixed width, space padded).
    Char,
}

impl XptType {
    /// Parse the NAMESTR `ntype` field (1 = numeric, 2 = character).
    #[must_use]
    pub fn from_ntype(ntype: i16) -> Option<Self> {
        match ntype {
            1 => Some(Self::Num),
            2 => Some(Self::Char),
            _ => None,
        }
    }

    /// NAMESTR `ntype` field value.
    #[must_use]
    pub fn to_ntype(self) -> i16 {
        match self {
            Self::Num => 1,
            Self::Char => 2,
        }
    }
}

impl fmt::Display for XptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num => write!(f, "Num"),
            Self::Char => write!(f, "Char"),
        }
    }
}

/// Display justification stored in the NAMESTR `nfj` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Right,
}

impl Justification {
    #[must_use]
    pub fn from_nfj(nfj: i16) -> Self {
        if nfj == 1 { Self::Right } else { Self::Left }
    }

    #[must_use]
    pub fn to_nfj(self) -> i16 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// A variable definition parsed from (or written to) a NAMESTR record.
#[derive(Debug, Clone, PartialEq)]
pub struct XptColumn {
    /// Variable name.
    pub name: String,
    /// Variable label.
    pub label: Option<String>,
    /// Storage type.
    pub data_type: XptType,
    /// Length in bytes within an observation.
    pub length: u16,
    /// Display format name (e.g. `DATE`, `BEST`).
    pub format: Option<String>,
    pub format_length: u16,
    pub format_decimals: u16,
    /// Input format name.
    pub informat: Option<String>,
    pub informat_length: u16,
    pub informat_decimals: u16,
    pub justification: Justification,
}

impl XptColumn {
    fn new(name: impl Into<String>, data_type: XptType, length: u16) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type,
            length,
            format: None,
            format_length: 0,
            format_decimals: 0,
            informat: None,
            informat_length: 0,
            informat_decimals: 0,
            justification: Justification::Left,
        }
    }

    /// Create an 8-byte numeric column.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, XptType::Num, 8)
    }

    /// Create a character column of the given width.
    #[must_use]
    pub fn character(name: impl Into<String>, length: u16) -> Self {
        Self::new(name, XptType::Char, length)
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: u16) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>, length: u16, decimals: u16) -> Self {
        self.format = Some(format.into());
        self.format_length = length;
        self.format_decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_informat(mut self, informat: impl Into<String>, length: u16, decimals: u16) -> Self {
        self.informat = Some(informat.into());
        self.informat_length = length;
        self.informat_decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    /// Whether the column is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.data_type == XptType::Num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntype_mapping() {
        assert_eq!(XptType::from_ntype(1), Some(XptType::Num));
        assert_eq!(XptType::from_ntype(2), Some(XptType::Char));
        assert_eq!(XptType::from_ntype(3), None);
        assert_eq!(XptType::Char.to_ntype(), 2);
    }

    #[test]
    fn test_builders() {
        let col = XptColumn::numeric("RIDAGEYR")
            .with_label("Age in years at screening")
            .with_format("F", 3, 0);
        assert!(col.is_numeric());
        assert_eq!(col.length, 8);
        assert_eq!(col.format.as_deref(), Some("F"));
        assert_eq!(col.format_length, 3);
    }
}
