//! Observation values.

use super::MissingValue;

/// A numeric cell: a value or one of the SAS missing codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Value(f64),
    Missing(MissingValue),
}

impl NumericValue {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.is_missing()
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Missing(_) => None,
        }
    }

    #[must_use]
    pub fn missing_type(&self) -> Option<MissingValue> {
        match self {
            Self::Missing(m) => Some(*m),
            Self::Value(_) => None,
        }
    }
}

/// A single cell of an observation.
#[derive(Debug, Clone, PartialEq)]
pub enum XptValue {
    Char(String),
    Num(NumericValue),
}

impl XptValue {
    #[must_use]
    pub fn character(value: impl Into<String>) -> Self {
        Self::Char(value.into())
    }

    #[must_use]
    pub fn numeric(value: f64) -> Self {
        Self::Num(NumericValue::Value(value))
    }

    #[must_use]
    pub fn numeric_missing() -> Self {
        Self::Num(NumericValue::Missing(MissingValue::Standard))
    }

    #[must_use]
    pub fn numeric_missing_with(missing: MissingValue) -> Self {
        Self::Num(NumericValue::Missing(missing))
    }

    /// Numeric cells holding a missing code, or blank character cells.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Num(num) => num.is_missing(),
            Self::Char(text) => text.trim().is_empty(),
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(num) => num.value(),
            Self::Char(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Char(text) => Some(text),
            Self::Num(_) => None,
        }
    }
}
