//! Unsigned LEB128 varints, as used by the transaction wire format
//!
//! Seven data bits per byte, least significant group first, high bit set on every byte
//! except the last.

/// Longest encoding of a `u64`
pub const MAX_UVARINT_LEN: usize = 10;

/// Encode `value` as a minimal unsigned varint
pub fn encode_uvarint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_UVARINT_LEN);
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

/// Decode an unsigned varint from the front of `bytes`
///
/// Returns the value and the number of bytes consumed. Truncated, overflowing and
/// non-minimal (trailing zero group) encodings yield `None`.
pub fn decode_uvarint(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (index, byte) in bytes.iter().copied().enumerate().take(MAX_UVARINT_LEN) {
        let group = u64::from(byte & 0x7f);
        let shift = 7 * index as u32;

        // the tenth byte may only carry the single remaining bit
        if index == MAX_UVARINT_LEN - 1 && byte > 1 {
            return None;
        }
        value |= group << shift;

        if byte & 0x80 == 0 {
            if index > 0 && byte == 0 {
                return None;
            }
            return Some((value, index + 1));
        }
    }
    None
}
