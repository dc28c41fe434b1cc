//! UTF-8 helpers that work on partially filled buffers.
//!
//! The runtime reads input in chunks, so a code point may be cut at the end
//! of the available bytes. [`decode`] distinguishes that case
//! ([`Utf8::Incomplete`]) from malformed input ([`Utf8::Invalid`]).

/// Longest UTF-8 encoding of one code point.
pub const UTF8_CH_MAXLEN: usize = 4;

/// Result of decoding one code point at the front of a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Utf8 {
    /// A complete code point and its encoded length.
    Char { ch: u32, len: usize },
    /// The buffer ends inside a code point; at least `need` bytes are required.
    Incomplete { need: usize },
    /// The bytes are not valid UTF-8.
    Invalid,
}

/// Number of bytes announced by a leading byte, or `None` for a
/// continuation or invalid leading byte.
#[inline]
pub fn width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Decode the code point at the front of `bytes`.
pub fn decode(bytes: &[u8]) -> Utf8 {
    let Some(&lead) = bytes.first() else {
        return Utf8::Incomplete { need: 1 };
    };
    let Some(len) = width(lead) else {
        return Utf8::Invalid;
    };
    if len == 1 {
        return Utf8::Char {
            ch: u32::from(lead),
            len: 1,
        };
    }
    let avail = bytes.len().min(len);
    if bytes[1..avail].iter().any(|&b| b & 0xC0 != 0x80) {
        return Utf8::Invalid;
    }
    if avail < len {
        return Utf8::Incomplete { need: len };
    }
    match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => s.chars().next().map_or(Utf8::Invalid, |c| Utf8::Char {
            ch: u32::from(c),
            len,
        }),
        Err(_) => Utf8::Invalid,
    }
}

/// Append the UTF-8 encoding of `ch` to `out`.
///
/// Returns the number of bytes written, or `None` if `ch` is not a Unicode
/// scalar value.
pub fn encode(ch: u32, out: &mut Vec<u8>) -> Option<usize> {
    let c = char::from_u32(ch)?;
    let mut buf = [0u8; UTF8_CH_MAXLEN];
    let s = c.encode_utf8(&mut buf);
    out.extend_from_slice(s.as_bytes());
    Some(s.len())
}

/// Number of code points in `bytes`, counting each invalid byte as one.
pub fn char_count(bytes: &[u8]) -> usize {
    let mut n = 0;
    let mut rest = bytes;
    while !rest.is_empty() {
        let step = match decode(rest) {
            Utf8::Char { len, .. } => len,
            Utf8::Incomplete { .. } | Utf8::Invalid => 1,
        };
        rest = &rest[step..];
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests;
