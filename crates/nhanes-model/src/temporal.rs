//! SAS date and datetime display formats.
//!
//! SAS stores dates as days and datetimes as seconds since 1960-01-01.
//! Only the display format tells a date apart from an ordinary number.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::value::Value;

/// Date formats whose values count days since the SAS epoch.
const DATE_FORMATS: &[&str] = &[
    "DATE", "DAY", "DDMMYY", "DDMMYYB", "DDMMYYC", "DDMMYYD", "DDMMYYN", "DDMMYYP", "DDMMYYS",
    "DOWNAME", "E8601DA", "B8601DA", "JULDAY", "JULIAN", "MMDDYY", "MMDDYYB", "MMDDYYC",
    "MMDDYYD", "MMDDYYN", "MMDDYYP", "MMDDYYS", "MMYY", "MONNAME", "MONTH", "MONYY", "NLDATE",
    "QTR", "WEEKDATE", "WEEKDATX", "WEEKDAY", "WORDDATE", "WORDDATX", "YEAR", "YYMM", "YYMMDD",
    "YYMMDDB", "YYMMDDC", "YYMMDDD", "YYMMDDN", "YYMMDDP", "YYMMDDS", "YYMON", "YYQ",
];

/// Datetime formats whose values count seconds since the SAS epoch.
const DATETIME_FORMATS: &[&str] = &[
    "B8601DT", "DATEAMPM", "DATETIME", "DTDATE", "E8601DT", "MDYAMPM", "NLDATM",
];

/// Whether a format marks dates or datetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Date,
    DateTime,
}

impl TemporalKind {
    /// Convert a numeric value; anything else passes through.
    #[must_use]
    pub fn convert(self, value: Value) -> Value {
        let Value::Number(raw) = value else {
            return value;
        };
        let converted = match self {
            Self::Date => sas_date(raw).map(Value::Date),
            Self::DateTime => sas_datetime(raw).map(Value::DateTime),
        };
        converted.unwrap_or(Value::Number(raw))
    }
}

/// Classify a SAS format name (`DATE9`, `yymmdd10.`, `E8601DT19`).
#[must_use]
pub fn temporal_kind(format: &str) -> Option<TemporalKind> {
    let name = format
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_digit() || c == '.')
        .to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }
    if DATE_FORMATS.contains(&name.as_str()) {
        Some(TemporalKind::Date)
    } else if DATETIME_FORMATS.contains(&name.as_str()) {
        Some(TemporalKind::DateTime)
    } else {
        None
    }
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1960, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Day count since 1960-01-01 to a date. Fractions of a day are dropped.
#[must_use]
pub fn sas_date(days: f64) -> Option<NaiveDate> {
    if !days.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_days(days.floor() as i64)?;
    epoch().date().checked_add_signed(delta)
}

/// Second count since 1960-01-01T00:00:00 to a datetime, to the millisecond.
#[must_use]
pub fn sas_datetime(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64)?;
    epoch().checked_add_signed(delta)
}
