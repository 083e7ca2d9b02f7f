//! Reader and writer options.

use std::fmt;

use chrono::NaiveDateTime;
use encoding_rs::Encoding;

use super::MissingValue;

/// Transport layout. NHANES publishes V5; V8 lifts names to 32 bytes and
/// adds a long-label section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XptVersion {
    #[default]
    V5,
    V8,
}

impl XptVersion {
    /// Longest variable or dataset name, in bytes.
    #[must_use]
    pub const fn name_limit(self) -> usize {
        match self {
            Self::V5 => 8,
            Self::V8 => 32,
        }
    }
}

impl fmt::Display for XptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::V5 => "V5",
            Self::V8 => "V8",
        })
    }
}

/// How character fields are decoded.
#[derive(Debug, Clone, Copy, Default)]
pub enum TextEncoding {
    /// Decode as UTF-8, replacing invalid sequences. No encoding is reported.
    #[default]
    Utf8Lossy,
    /// Pick UTF-8 when every text field is valid UTF-8, else Windows-1252,
    /// and report the choice on the dataset.
    Detect,
    /// Always decode with the given encoding.
    Fixed(&'static Encoding),
}

/// Options for reading XPT files.
#[derive(Debug, Clone)]
pub struct XptReaderOptions {
    /// Require the exact record layout (default: true).
    ///
    /// When disabled the reader pads a truncated final record, drops a
    /// partial trailing observation, assumes the standard NAMESTR length when
    /// the member header is unreadable, and accepts an empty dataset name.
    pub strict: bool,
    /// Trim trailing spaces from character values (default: true).
    pub trim_strings: bool,
    /// Character decoding (default: lossy UTF-8).
    pub encoding: TextEncoding,
}

impl Default for XptReaderOptions {
    fn default() -> Self {
        Self {
            strict: true,
            trim_strings: true,
            encoding: TextEncoding::Utf8Lossy,
        }
    }
}

impl XptReaderOptions {
    /// Lenient layout handling with encoding detection.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            trim_strings: true,
            encoding: TextEncoding::Detect,
        }
    }
}

/// Options for writing XPT files.
#[derive(Debug, Clone)]
pub struct XptWriterOptions {
    pub version: XptVersion,
    /// Release string in the real header, e.g. `9.4`.
    pub sas_version: String,
    pub os_name: String,
    /// Stamped as both created and modified. `None` uses the local clock.
    pub timestamp: Option<NaiveDateTime>,
    /// 140, or 136 for files written on VAX/VMS.
    pub namestr_length: usize,
    /// Code written for NaN and infinite numerics.
    pub missing_numeric: MissingValue,
}

impl Default for XptWriterOptions {
    fn default() -> Self {
        Self {
            version: XptVersion::V5,
            sas_version: "9.4".to_string(),
            os_name: "X64_10PR".to_string(),
            timestamp: None,
            namestr_length: 140,
            missing_numeric: MissingValue::Standard,
        }
    }
}

impl XptWriterOptions {
    #[must_use]
    pub fn with_version(mut self, version: XptVersion) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Header timestamp as `ddMMMyy:hh:mm:ss`, upper case.
    #[must_use]
    pub fn header_timestamp(&self) -> String {
        self.timestamp
            .unwrap_or_else(|| chrono::Local::now().naive_local())
            .format("%d%b%y:%H:%M:%S")
            .to_string()
            .to_uppercase()
    }
}
