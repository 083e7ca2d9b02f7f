//! Column type inference from realized values.
//!
//! The reported type of a column depends only on the values it holds, never
//! on the storage type the file declares. Missing values and blank text are
//! ignored; what remains decides the type:
//!
//! 1. Nothing left: `empty`
//! 2. Only numbers: `integer` when every value is integral, else `float`
//! 3. Only dates: `date`; dates mixed with datetimes: `datetime`
//! 4. Only text: `date` or `datetime` when every value parses as an ISO
//!    date or datetime, else `text`
//! 5. Any other mixture: `text`

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Scalar type of a column, inferred from its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Integer,
    Float,
    Text,
    Date,
    DateTime,
    Empty,
}

impl InferredType {
    /// Display name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Empty => "empty",
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    /// Count columns per type, ordered by type.
    #[must_use]
    pub fn tally(types: impl IntoIterator<Item = Self>) -> BTreeMap<Self, usize> {
        let mut counts = BTreeMap::new();
        for ty in types {
            *counts.entry(ty).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct Seen {
    numbers: bool,
    fractional: bool,
    texts: bool,
    dates: bool,
    datetimes: bool,
}

/// Infer the type of a column from its values.
#[must_use]
pub fn infer_type(values: &[Value]) -> InferredType {
    let mut seen = Seen::default();
    let mut texts: Vec<&str> = Vec::new();

    for value in values.iter().filter(|v| !v.is_blank()) {
        match value {
            Value::Number(v) => {
                seen.numbers = true;
                if !v.is_finite() || v.fract() != 0.0 {
                    seen.fractional = true;
                }
            }
            Value::Text(s) => {
                seen.texts = true;
                texts.push(s.trim());
            }
            Value::Date(_) => seen.dates = true,
            Value::DateTime(_) => seen.datetimes = true,
            Value::Missing => {}
        }
    }

    let kinds = [seen.numbers, seen.texts, seen.dates || seen.datetimes]
        .iter()
        .filter(|&&k| k)
        .count();

    match kinds {
        0 => InferredType::Empty,
        1 if seen.numbers && seen.fractional => InferredType::Float,
        1 if seen.numbers => InferredType::Integer,
        1 if seen.datetimes => InferredType::DateTime,
        1 if seen.dates => InferredType::Date,
        1 => infer_text(&texts),
        _ => InferredType::Text,
    }
}

fn infer_text(texts: &[&str]) -> InferredType {
    if texts.iter().all(|s| parse_iso_date(s).is_some()) {
        InferredType::Date
    } else if texts.iter().all(|s| parse_iso_datetime(s).is_some()) {
        InferredType::DateTime
    } else {
        InferredType::Text
    }
}

/// Parse `YYYY-MM-DD`.
#[must_use]
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Parse an ISO datetime with a `T` or space separator and optional
/// fractional seconds.
#[must_use]
pub fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numbers() {
        let ints = [Value::Number(1.0), Value::Missing, Value::Number(-40.0)];
        assert_eq!(infer_type(&ints), InferredType::Integer);

        let floats = [Value::Number(1.0), Value::Number(0.5)];
        assert_eq!(infer_type(&floats), InferredType::Float);

        let inf = [Value::Number(f64::INFINITY)];
        assert_eq!(infer_type(&inf), InferredType::Float);
    }

    #[test]
    fn test_empty_column() {
        assert_eq!(infer_type(&[]), InferredType::Empty);
        let blanks = [Value::Missing, Value::from(""), Value::from("   ")];
        assert_eq!(infer_type(&blanks), InferredType::Empty);
    }

    #[test]
    fn test_temporal_values() {
        let dates = [Value::Date(date(2017, 1, 1)), Value::Missing];
        assert_eq!(infer_type(&dates), InferredType::Date);

        let mixed = [
            Value::Date(date(2017, 1, 1)),
            Value::DateTime(date(2017, 1, 2).and_hms_opt(3, 4, 5).unwrap()),
        ];
        assert_eq!(infer_type(&mixed), InferredType::DateTime);
    }

    #[test]
    fn test_text_columns() {
        let text = [Value::from("Male"), Value::from("Female")];
        assert_eq!(infer_type(&text), InferredType::Text);

        let iso_dates = [Value::from("2017-01-31"), Value::from("")];
        assert_eq!(infer_type(&iso_dates), InferredType::Date);

        let iso_datetimes = [Value::from("2017-01-31T10:00:00"), Value::from("2017-02-01 11:30:00")];
        assert_eq!(infer_type(&iso_datetimes), InferredType::DateTime);

        // Numeric-looking text stays text
        let codes = [Value::from("01"), Value::from("02")];
        assert_eq!(infer_type(&codes), InferredType::Text);
    }

    #[test]
    fn test_mixtures_are_text() {
        let mixed = [Value::Number(1.0), Value::from("A")];
        assert_eq!(infer_type(&mixed), InferredType::Text);

        let mixed = [Value::Number(1.0), Value::Date(date(2017, 1, 1))];
        assert_eq!(infer_type(&mixed), InferredType::Text);
    }

    #[test]
    fn test_display_and_groups() {
        assert_eq!(InferredType::DateTime.to_string(), "datetime");
        assert!(InferredType::Float.is_numeric());
        assert!(InferredType::Date.is_temporal());
        assert!(!InferredType::Empty.is_numeric());

        let tally = InferredType::tally([
            InferredType::Text,
            InferredType::Integer,
            InferredType::Text,
        ]);
        assert_eq!(
            tally.into_iter().collect::<Vec<_>>(),
            vec![(InferredType::Integer, 1), (InferredType::Text, 2)]
        );
    }

    proptest! {
        #[test]
        fn prop_integral_numbers_are_integer(values in prop::collection::vec(-1_000_000i64..1_000_000, 1..50)) {
            let column: Vec<Value> = values.iter().map(|&v| Value::Number(v as f64)).collect();
            prop_assert_eq!(infer_type(&column), InferredType::Integer);
        }

        #[test]
        fn prop_missing_values_do_not_change_type(
            values in prop::collection::vec(-1e6f64..1e6, 1..30),
            gaps in prop::collection::vec(any::<bool>(), 1..30),
        ) {
            let dense: Vec<Value> = values.iter().map(|&v| Value::Number(v)).collect();
            let mut sparse = Vec::new();
            for (value, gap) in dense.iter().zip(gaps.iter().cycle()) {
                if *gap {
                    sparse.push(Value::Missing);
                }
                sparse.push(value.clone());
            }
            prop_assert_eq!(infer_type(&dense), infer_type(&sparse));
        }
    }
}
