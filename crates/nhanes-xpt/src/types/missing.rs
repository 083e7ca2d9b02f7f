//! SAS missing value codes.

use std::fmt;

/// One of the 28 SAS numeric missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValue {
    /// `.`
    #[default]
    Standard,
    /// `._`
    Underscore,
    /// `.A` through `.Z`
    Special(char),
}

impl MissingValue {
    /// Decode the first byte of a missing numeric field.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'.' => Some(Self::Standard),
            b'_' => Some(Self::Underscore),
            b'A'..=b'Z' => Some(Self::Special(byte as char)),
            _ => None,
        }
    }

    /// First byte of the encoded field.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Standard => b'.',
            Self::Underscore => b'_',
            Self::Special(c) if c.is_ascii_uppercase() => c as u8,
            Self::Special(_) => b'.',
        }
    }
}

impl fmt::Display for MissingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "."),
            Self::Underscore => write!(f, "._"),
            Self::Special(c) => write!(f, ".{c}"),
        }
    }
}
