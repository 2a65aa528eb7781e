//! HART packed ASCII (6-bit character) coding.
//!
//! Tags and descriptors travel on the wire as "packed ASCII": each
//! character is reduced to its low six bits and the 6-bit values are
//! bit-packed big-endian, so eight characters fit in six bytes.
//!
//! The usable alphabet is the 64 characters `@A-Z[\]^_ !"#$%&'()*+,-./`
//! `0-9:;<=>?`; lowercase letters alias their uppercase forms.

/// Pack a tag into 6-bit packed ASCII.
///
/// Only the final eight characters are packed; tag fields on the wire are
/// at most eight characters wide. Returns `ceil(n * 6 / 8)` bytes, with
/// the first character in the most significant bits.
pub fn pack_ascii(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let start = bytes.len().saturating_sub(8);
    let chars = &bytes[start..];

    let mut acc: u64 = 0;
    for &b in chars {
        acc = (acc << 6) | u64::from(b & 0x3F);
    }
    let out_len = (chars.len() * 6 + 7) / 8;
    let mut out = vec![0u8; out_len];
    for slot in out.iter_mut().rev() {
        *slot = (acc & 0xFF) as u8;
        acc >>= 8;
    }
    out
}

/// Unpack 6-bit packed ASCII back into a string.
///
/// Each complete 6-bit group yields one character; values below 0x20 map
/// back into the `@A-Z...` range, the rest are ASCII as-is. Trailing bits
/// that do not form a full group are ignored.
pub fn unpack_ascii(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 8 / 6);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &b in data {
        acc = (acc << 8) | u32::from(b);
        bits += 8;
        while bits >= 6 {
            bits -= 6;
            let v = ((acc >> bits) & 0x3F) as u8;
            out.push(char::from(if v < 0x20 { v + 0x40 } else { v }));
        }
    }
    out
}
