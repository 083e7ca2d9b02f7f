//! Endian-aware reads and writes over a byte buffer.

use crate::error::{Result, Sas7bdatError};
use crate::types::Endianness;

/// Read-only view of file bytes in a given byte order.
#[derive(Clone, Copy)]
pub(crate) struct ByteView<'a> {
    pub data: &'a [u8],
    pub endianness: Endianness,
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8], endianness: Endianness) -> Self {
        Self { data, endianness }
    }

    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Sas7bdatError::Truncated { offset })
    }

    /// Unsigned integer of 1, 2, 4 or 8 bytes.
    pub fn uint(&self, offset: usize, len: usize) -> Result<u64> {
        let bytes = self.slice(offset, len)?;
        let mut buf = [0u8; 8];
        match self.endianness {
            Endianness::Little => {
                buf[..len].copy_from_slice(bytes);
                Ok(u64::from_le_bytes(buf))
            }
            Endianness::Big => {
                buf[8 - len..].copy_from_slice(bytes);
                Ok(u64::from_be_bytes(buf))
            }
        }
    }

    pub fn u16(&self, offset: usize) -> Result<usize> {
        Ok(self.uint(offset, 2)? as usize)
    }

    pub fn usize(&self, offset: usize, len: usize) -> Result<usize> {
        usize::try_from(self.uint(offset, len)?).map_err(|_| Sas7bdatError::Truncated { offset })
    }

    pub fn f64(&self, offset: usize) -> Result<f64> {
        Ok(f64::from_bits(self.uint(offset, 8)?))
    }
}

/// Decode a numeric cell stored in `bytes.len()` (1 to 8) bytes.
///
/// Short numerics keep their most significant bytes, which sit at the end of
/// the field in little-endian files and at the start in big-endian files.
pub(crate) fn decode_number(bytes: &[u8], endianness: Endianness) -> f64 {
    let len = bytes.len().min(8);
    let mut buf = [0u8; 8];
    match endianness {
        Endianness::Little => {
            buf[8 - len..].copy_from_slice(&bytes[..len]);
            f64::from_le_bytes(buf)
        }
        Endianness::Big => {
            buf[..len].copy_from_slice(&bytes[..len]);
            f64::from_be_bytes(buf)
        }
    }
}

/// Write an unsigned integer of `len` bytes at `offset`.
pub(crate) fn put_uint(buf: &mut [u8], offset: usize, len: usize, value: u64, endianness: Endianness) {
    let field = &mut buf[offset..offset + len];
    match endianness {
        Endianness::Little => field.copy_from_slice(&value.to_le_bytes()[..len]),
        Endianness::Big => field.copy_from_slice(&value.to_be_bytes()[8 - len..]),
    }
}

pub(crate) fn put_f64(buf: &mut [u8], offset: usize, value: f64, endianness: Endianness) {
    put_uint(buf, offset, 8, value.to_bits(), endianness);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_both_orders() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(ByteView::new(&data, Endianness::Little).uint(0, 2).unwrap(), 0x0201);
        assert_eq!(ByteView::new(&data, Endianness::Big).uint(0, 2).unwrap(), 0x0102);
        assert_eq!(ByteView::new(&data, Endianness::Big).uint(0, 4).unwrap(), 0x0102_0304);
        assert!(ByteView::new(&data, Endianness::Big).uint(2, 4).is_err());
    }

    #[test]
    fn test_put_uint_roundtrip() {
        for endianness in [Endianness::Little, Endianness::Big] {
            let mut buf = [0u8; 12];
            put_uint(&mut buf, 2, 8, 0x1122_3344_5566_7788, endianness);
            put_uint(&mut buf, 10, 2, 0xBEEF, endianness);
            let view = ByteView::new(&buf, endianness);
            assert_eq!(view.uint(2, 8).unwrap(), 0x1122_3344_5566_7788);
            assert_eq!(view.u16(10).unwrap(), 0xBEEF);
        }
    }

    #[test]
    fn test_truncated_numbers() {
        let value = 93703.0f64;
        let le = value.to_le_bytes();
        assert_eq!(decode_number(&le[3..], Endianness::Little), value);

        let be = value.to_be_bytes();
        assert_eq!(decode_number(&be[..5], Endianness::Big), value);
        assert!(decode_number(&f64::NAN.to_le_bytes(), Endianness::Little).is_nan());
    }
}
