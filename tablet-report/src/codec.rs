//! Byte-level primitives for reading report fields
//!
//! Every accessor is bounds-checked and reports a short buffer as
//! [`ReportError::Malformed`]. Nothing here allocates.

use crate::error::ReportError;

/// Check whether `bit` (0 = least significant) is set in `byte`.
///
/// Bit indices above 7 are never set.
#[inline]
pub fn is_bit_set(byte: u8, bit: u8) -> bool {
    bit < 8 && byte & (1 << bit) != 0
}

/// Read a single byte at `offset`
#[inline]
pub fn byte_at(raw: &[u8], offset: usize) -> Result<u8, ReportError> {
    raw.get(offset).copied().ok_or(ReportError::Malformed {
        needed: offset.saturating_add(1),
        actual: raw.len(),
    })
}

/// Test bit `bit` of the byte at `offset`
#[inline]
pub fn bit_at(raw: &[u8], offset: usize, bit: u8) -> Result<bool, ReportError> {
    byte_at(raw, offset).map(|b| is_bit_set(b, bit))
}

/// Read a little-endian u16 starting at `offset`
#[inline]
pub fn read_u16_le(raw: &[u8], offset: usize) -> Result<u16, ReportError> {
    let end = offset.saturating_add(2);
    match raw.get(offset..end) {
        Some(&[lo, hi]) => Ok(u16::from_le_bytes([lo, hi])),
        _ => Err(ReportError::Malformed {
            needed: end,
            actual: raw.len(),
        }),
    }
}
