//! Number scanning.
//!
//! Grammar, in order of precedence:
//!
//! 1. A `0` not followed by `.` tries the radix prefixes, longest first. A
//!    prefix counts only when at least one digit of its radix follows.
//! 2. Otherwise the number is decimal: digits, an optional fraction (a `.`
//!    followed by a digit) and an optional exponent (`e`/`E`, optional sign,
//!    a digit). `007` is decimal.
//! 3. The longest registered suffix that starts the remaining text is taken.
//!    No boundary check follows, so `123abc` is `123` then `abc`.
//!
//! The lexeme keeps the source text (prefix and sign included) minus digit
//! separators, and never the suffix.

use smallvec::SmallVec;

use crate::spec::NumberSyntax;

/// Lexeme storage; short lexemes stay inline.
pub type Lexeme = SmallVec<[u8; 32]>;

/// Classification of a number token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberInfo {
    radix: u32,
    real: bool,
    zero: bool,
    suffix: Option<u8>,
    digits_start: u8,
}

impl NumberInfo {
    #[inline]
    pub fn radix(&self) -> u32 {
        self.radix
    }

    #[inline]
    pub fn is_real(&self) -> bool {
        self.real
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        !self.real
    }

    /// All digits are zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.zero
    }

    /// Index of the suffix in [`NumberSyntax::suffixes`].
    #[inline]
    pub fn suffix_index(&self) -> Option<usize> {
        self.suffix.map(usize::from)
    }

    /// Offset of the first digit in the lexeme, after sign and prefix.
    #[inline]
    pub fn digits_start(&self) -> usize {
        usize::from(self.digits_start)
    }
}

/// A scanned number: its classification and the source bytes it used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Scanned {
    pub info: NumberInfo,
    pub len: usize,
}

#[inline]
fn is_digit(byte: u8, radix: u32) -> bool {
    char::from(byte).to_digit(radix).is_some()
}

/// Copy digits of `radix` from `text[pos..]`; a separator is skipped when it
/// sits between two digits. Returns the position after the last digit.
fn scan_digits(text: &[u8], pos: usize, radix: u32, sep: Option<u8>, out: &mut Lexeme) -> usize {
    let mut i = pos;
    while let Some(&b) = text.get(i) {
        if is_digit(b, radix) {
            out.push(b);
            i += 1;
        } else if Some(b) == sep
            && i > pos
            && text.get(i + 1).is_some_and(|&next| is_digit(next, radix))
        {
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// Scan a number at the start of `text`, appending its lexeme to `out`.
///
/// `out` may already hold a folded `-`. Returns `None` (leaving `out`
/// untouched) when `text` does not start a number.
pub(crate) fn scan(syntax: &NumberSyntax, text: &[u8], out: &mut Lexeme) -> Option<Scanned> {
    let base = out.len();
    let sep = syntax.separator;

    let mut prefixed = None;
    if text.first() == Some(&b'0') && text.get(1) != Some(&b'.') {
        for prefix in &syntax.prefixes {
            if !text.starts_with(&prefix.text) {
                continue;
            }
            let mut digits = Lexeme::new();
            let end = scan_digits(text, prefix.text.len(), prefix.radix, sep, &mut digits);
            if digits.is_empty() {
                continue;
            }
            out.extend_from_slice(&prefix.text);
            let digits_start = out.len();
            out.extend_from_slice(&digits);
            prefixed = Some((prefix.radix, digits_start, end));
            break;
        }
    }

    let (radix, real, digits_start, mut pos) = match prefixed {
        Some((radix, digits_start, end)) => (radix, false, digits_start, end),
        None => {
            let digits_start = out.len();
            let mut pos = scan_digits(text, 0, 10, sep, out);
            let mut real = false;
            if text.get(pos) == Some(&b'.') && text.get(pos + 1).is_some_and(u8::is_ascii_digit) {
                out.push(b'.');
                pos = scan_digits(text, pos + 1, 10, sep, out);
                real = true;
            }
            if pos == 0 {
                out.truncate(base);
                return None;
            }
            if matches!(text.get(pos), Some(b'e' | b'E')) {
                let mut exp = pos + 1;
                if matches!(text.get(exp), Some(b'+' | b'-')) {
                    exp += 1;
                }
                if text.get(exp).is_some_and(u8::is_ascii_digit) {
                    out.extend_from_slice(&text[pos..exp]);
                    pos = scan_digits(text, exp, 10, sep, out);
                    real = true;
                }
            }
            (10, real, digits_start, pos)
        }
    };

    let mantissa = &out[digits_start..];
    let mantissa = match mantissa.iter().position(|&b| b == b'e' || b == b'E') {
        Some(at) if radix == 10 => &mantissa[..at],
        _ => mantissa,
    };
    let zero = mantissa.iter().all(|&b| b == b'0' || b == b'.');

    let rest = &text[pos..];
    let suffix = syntax
        .suffixes
        .iter()
        .position(|s| rest.starts_with(s.as_bytes()));
    if let Some(i) = suffix {
        pos += syntax.suffixes[i].len();
    }

    Some(Scanned {
        info: NumberInfo {
            radix,
            real,
            zero,
            suffix: suffix.and_then(|i| u8::try_from(i).ok()),
            digits_start: u8::try_from(digits_start).unwrap_or(u8::MAX),
        },
        len: pos,
    })
}

/// Integer value of a non-negative integer lexeme.
pub(crate) fn to_u64(lexeme: &[u8], info: &NumberInfo) -> Option<u64> {
    if info.real || lexeme.first() == Some(&b'-') {
        return None;
    }
    let digits = std::str::from_utf8(lexeme.get(info.digits_start()..)?).ok()?;
    u64::from_str_radix(digits, info.radix).ok()
}

/// Integer value of an integer lexeme, folded minus included.
pub(crate) fn to_i64(lexeme: &[u8], info: &NumberInfo) -> Option<i64> {
    if info.real {
        return None;
    }
    let digits = std::str::from_utf8(lexeme.get(info.digits_start()..)?).ok()?;
    let magnitude = i128::from(u64::from_str_radix(digits, info.radix).ok()?);
    let value = if lexeme.first() == Some(&b'-') {
        -magnitude
    } else {
        magnitude
    };
    i64::try_from(value).ok()
}

/// Floating-point value of any number lexeme.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn to_f64(lexeme: &[u8], info: &NumberInfo) -> Option<f64> {
    if info.real {
        return std::str::from_utf8(lexeme).ok()?.parse().ok();
    }
    to_i64(lexeme, info)
        .map(|v| v as f64)
        .or_else(|| to_u64(lexeme, info).map(|v| v as f64))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
