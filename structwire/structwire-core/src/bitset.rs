//! Packing of presence bit-vectors.
//!
//! Bit `i` lives in byte `len - 1 - i / 8` at position `i % 8`, so the
//! lowest-numbered bits sit in the last byte.

/// Number of bytes needed for `width` bits.
pub fn packed_len(width: usize) -> usize {
    width.div_ceil(8)
}

pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let len = packed_len(bits.len());
    let mut out = vec![0u8; len];
    for (i, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
        out[len - 1 - i / 8] |= 1 << (i % 8);
    }
    out
}

/// Inverse of [`pack_bits`]; bits past `width` are ignored.
pub fn unpack_bits(bytes: &[u8], width: usize) -> Vec<bool> {
    let len = bytes.len();
    (0..width)
        .map(|i| {
            i / 8 < len && bytes[len - 1 - i / 8] & (1 << (i % 8)) != 0
        })
        .collect()
}
