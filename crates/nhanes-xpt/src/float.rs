//! IBM mainframe floating-point conversion.
//!
//! Transport files store numerics as IBM System/360 hexadecimal floats:
//! one sign bit, a 7-bit base-16 exponent biased by 64, and a 56-bit
//! fraction. Missing values reuse the first byte as a code and zero the
//! rest.

use crate::types::MissingValue;

const FRACTION_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;
const FRACTION_LIMIT: u64 = 1 << 56;

/// Convert 8 bytes of IBM float to an IEEE `f64`.
#[must_use]
pub fn ibm_to_ieee(bytes: [u8; 8]) -> f64 {
    let raw = u64::from_be_bytes(bytes);
    let fraction = raw & FRACTION_MASK;
    if fraction == 0 {
        return 0.0;
    }
    let negative = raw >> 63 == 1;
    let exponent = ((raw >> 56) & 0x7F) as i32;

    // value = 0.F * 16^(exp - 64) = F * 2^(4 * (exp - 64) - 56)
    let magnitude = fraction as f64 * 2f64.powi(4 * (exponent - 64) - 56);
    if negative { -magnitude } else { magnitude }
}

/// Convert an IEEE `f64` to 8 bytes of IBM float.
///
/// Values beyond the IBM range saturate to the largest magnitude; values
/// below it flush to zero. NaN encodes as the standard missing value.
#[must_use]
pub fn ieee_to_ibm(value: f64) -> [u8; 8] {
    if value.is_nan() {
        return encode_missing(MissingValue::Standard);
    }
    if value == 0.0 {
        return [0u8; 8];
    }

    let negative = value.is_sign_negative();
    let mut magnitude = value.abs();
    if magnitude.is_infinite() {
        return saturated(negative);
    }

    // Normalise so that magnitude = f * 16^exponent with f in [1/16, 1).
    let mut exponent = 0i32;
    while magnitude >= 1.0 {
        magnitude /= 16.0;
        exponent += 1;
    }
    while magnitude < 0.0625 {
        magnitude *= 16.0;
        exponent -= 1;
    }

    let mut fraction = (magnitude * FRACTION_LIMIT as f64).round() as u64;
    if fraction >= FRACTION_LIMIT {
        fraction >>= 4;
        exponent += 1;
    }

    let biased = exponent + 64;
    if biased > 127 {
        return saturated(negative);
    }
    if biased < 0 {
        return [0u8; 8];
    }

    let sign = if negative { 1u64 << 63 } else { 0 };
    let raw = sign | ((biased as u64) << 56) | (fraction & FRACTION_MASK);
    raw.to_be_bytes()
}

fn saturated(negative: bool) -> [u8; 8] {
    let sign = if negative { 1u64 << 63 } else { 0 };
    (sign | (0x7Fu64 << 56) | FRACTION_MASK).to_be_bytes()
}

/// Check whether a numeric field holds a SAS missing value.
///
/// A missing value has a code in the first byte (`.`, `_` or `A`-`Z`) and
/// zeros in every following byte.
#[must_use]
pub fn is_missing(bytes: &[u8]) -> Option<MissingValue> {
    let (&first, rest) = bytes.split_first()?;
    if rest.iter().any(|&b| b != 0) {
        return None;
    }
    MissingValue::from_byte(first)
}

/// Encode a missing value as an 8-byte numeric field.
#[must_use]
pub fn encode_missing(missing: MissingValue) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    bytes[0] = missing.to_byte();
    bytes
}

/// Truncate an IBM float to a shorter stored length (3 to 8 bytes).
#[must_use]
pub fn truncate_ibm(bytes: [u8; 8], length: usize) -> Vec<u8> {
    bytes[..length.clamp(1, 8)].to_vec()
}
