//! Realized cell values.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// One realized cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing in the source (any SAS missing code, or no value).
    Missing,
    Number(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Whether the value carries no data. NaN numbers count as missing.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Missing, or text that is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            other => other.is_missing(),
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Number(value)
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Cell text as written to CSV and shown in previews.
///
/// Missing values render as an empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(v) => f.write_str(&format_number(*v)),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Format a number for text output.
///
/// Integral values below 1e15 print without a decimal part. Other values
/// with magnitude in [1e-4, 1e15) use the shortest round-trip decimal, and
/// the rest use scientific notation. NaN prints as an empty string.
#[must_use]
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        return String::new();
    }
    let magnitude = v.abs();
    if v.fract() == 0.0 && magnitude < 1e15 {
        // -0.0 prints as "0"
        return format!("{}", v as i64);
    }
    if (1e-4..1e15).contains(&magnitude) {
        format!("{v}")
    } else {
        format!("{v:e}")
    }
}
