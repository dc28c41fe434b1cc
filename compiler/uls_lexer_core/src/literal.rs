//! Quote types and the resumable literal decoder.
//!
//! # Design
//!
//! Decoding is an explicit state machine. [`DecodeState`] holds only what is
//! needed to resume, and [`DecodeState::step`] consumes a prefix of the
//! available raw bytes, appends decoded bytes to the output and reports via
//! [`Advance::need`] how many bytes it wants before the next step. The input
//! layer uses that to refill in the middle of an escape sequence without
//! re-decoding anything.
//!
//! ```text
//! Plain --escape sym--> EscapeSelect --fixed / unknown--> Plain
//!   |                        |
//!   |                        +--numeric--> EscapeDigits --> Plain
//!   +--end mark--> Done
//! ```
//!
//! `Done` never consumes the end mark; the caller skips it (or leaves it in
//! place for right-exclusive quotes).

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::escape_map::{Emit, EscapeKind, EscapeMap, Radix};
use crate::token::ViewId;
use crate::utf8::{self, Utf8};

bitflags! {
    /// Behaviour of a quote type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct QuoteFlags: u16 {
        /// Newlines may appear inside the literal.
        const MULTILINE = 0x01;
        /// The start mark is consumed and dismissed; no token is produced.
        const NOTHING = 0x02;
        /// The start mark alone yields a token with empty text.
        const OPEN = 0x04;
        /// The end mark is left in the input.
        const R_EXCLUSIVE = 0x08;
        /// The end mark differs from the start mark.
        const ASYMMETRIC = 0x10;
    }
}

/// Errors raised while decoding a literal.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The raw input ended before the end mark.
    #[error("unterminated literal")]
    Unterminated,
    /// A newline in a literal whose quote type is single-line.
    #[error("newline in single-line literal")]
    Newline,
    /// A numeric escape without digits or with an unencodable value.
    #[error("invalid escape sequence after `{0}`")]
    InvalidEscape(char),
    /// Malformed UTF-8 after the escape symbol.
    #[error("malformed utf-8 in literal")]
    Encoding,
}

/// Where the decoder is within a literal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodeState {
    /// Copying raw bytes.
    #[default]
    Plain,
    /// The escape symbol was consumed; the next code point selects the escape.
    EscapeSelect,
    /// Reading the digits of a numeric escape.
    EscapeDigits {
        radix: Radix,
        emit: Emit,
        /// Digits still allowed.
        remaining: u8,
        /// Digits read so far, including a seeded selector digit.
        read: u8,
        selector: char,
        value: u32,
    },
    /// The end mark is at the front of the input.
    Done,
}

/// Progress reported by one decoder step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Advance {
    /// Raw bytes consumed.
    pub consumed: usize,
    /// Bytes the next step wants available at the front of the input.
    pub need: usize,
    /// Newlines consumed.
    pub newlines: usize,
}

/// Custom decoding for a quote type.
///
/// An analyzer replaces the built-in escape handling. It follows the same
/// protocol as [`DecodeState::step`]: consume a prefix, append output,
/// report what it needs next and return [`DecodeState::Done`] with the end
/// mark still at the front of the input.
pub trait LiteralAnalyzer: fmt::Debug + Send + Sync {
    fn step(
        &self,
        quote: &QuoteType,
        state: DecodeState,
        input: &[u8],
        at_end: bool,
        out: &mut Vec<u8>,
    ) -> Result<(DecodeState, Advance), DecodeError>;
}

/// A literal-string delimiter pair with its decoding rules.
#[derive(Clone, Debug)]
pub struct QuoteType {
    start: Box<[u8]>,
    end: Box<[u8]>,
    flags: QuoteFlags,
    view: ViewId,
    escapes: Option<EscapeMap>,
    analyzer: Option<Arc<dyn LiteralAnalyzer>>,
    start_lfs: usize,
    end_lfs: usize,
}

impl QuoteType {
    /// Quote with the given marks yielding tokens of `view`.
    ///
    /// A start mark different from the end mark sets
    /// [`QuoteFlags::ASYMMETRIC`].
    pub fn new(start: &str, end: &str, view: ViewId) -> Self {
        let mut flags = QuoteFlags::empty();
        if start != end {
            flags |= QuoteFlags::ASYMMETRIC;
        }
        Self {
            start: start.as_bytes().into(),
            end: end.as_bytes().into(),
            flags,
            view,
            escapes: None,
            analyzer: None,
            start_lfs: count_newlines(start.as_bytes()),
            end_lfs: count_newlines(end.as_bytes()),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: QuoteFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn with_escapes(mut self, escapes: EscapeMap) -> Self {
        self.escapes = Some(escapes);
        self
    }

    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn LiteralAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    #[inline]
    pub fn start(&self) -> &[u8] {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &[u8] {
        &self.end
    }

    #[inline]
    pub fn flags(&self) -> QuoteFlags {
        self.flags
    }

    #[inline]
    pub fn view(&self) -> ViewId {
        self.view
    }

    #[inline]
    pub fn escapes(&self) -> Option<&EscapeMap> {
        self.escapes.as_ref()
    }

    /// Newlines inside the start mark.
    #[inline]
    pub fn start_lfs(&self) -> usize {
        self.start_lfs
    }

    /// Newlines inside the end mark.
    #[inline]
    pub fn end_lfs(&self) -> usize {
        self.end_lfs
    }

    /// Whether the literal body is decoded at all.
    ///
    /// `NOTHING` and `OPEN` quotes end right after their start mark.
    #[inline]
    pub fn has_body(&self) -> bool {
        !self.flags.intersects(QuoteFlags::NOTHING | QuoteFlags::OPEN)
    }

    /// Run one step with the custom analyzer, or the built-in decoder.
    pub fn step(
        &self,
        state: DecodeState,
        input: &[u8],
        at_end: bool,
        out: &mut Vec<u8>,
    ) -> Result<(DecodeState, Advance), DecodeError> {
        match &self.analyzer {
            Some(analyzer) => analyzer.step(self, state, input, at_end, out),
            None => state.step(self, input, at_end, out),
        }
    }

    /// Decode a whole literal body held in memory.
    ///
    /// `input` starts right after the start mark. Returns the decoded text,
    /// the raw length up to and including the end mark (excluding it for
    /// right-exclusive quotes) and the newlines consumed.
    pub fn decode(&self, input: &[u8]) -> Result<Decoded, DecodeError> {
        let mut out = Vec::new();
        let mut pos = 0;
        let mut newlines = 0;
        let mut state = DecodeState::Plain;
        if self.has_body() {
            while state != DecodeState::Done {
                let (next, adv) = self.step(state, &input[pos..], true, &mut out)?;
                if next == state && adv.consumed == 0 {
                    return Err(DecodeError::Unterminated);
                }
                pos += adv.consumed;
                newlines += adv.newlines;
                state = next;
            }
            if !self.flags.contains(QuoteFlags::R_EXCLUSIVE) {
                pos += self.end.len();
                newlines += self.end_lfs;
            }
        }
        Ok(Decoded {
            text: out,
            raw_len: pos,
            newlines,
        })
    }
}

/// Result of [`QuoteType::decode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub text: Vec<u8>,
    pub raw_len: usize,
    pub newlines: usize,
}

#[inline]
fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

impl DecodeState {
    /// Advance the built-in decoder over a prefix of `input`.
    ///
    /// `at_end` tells the decoder that no more raw bytes will follow, so an
    /// incomplete end mark or escape is final.
    pub fn step(
        self,
        quote: &QuoteType,
        input: &[u8],
        at_end: bool,
        out: &mut Vec<u8>,
    ) -> Result<(DecodeState, Advance), DecodeError> {
        match self {
            DecodeState::Plain => step_plain(quote, input, at_end, out),
            DecodeState::EscapeSelect => step_select(quote, input, at_end, out),
            DecodeState::EscapeDigits {
                radix,
                emit,
                remaining,
                read,
                selector,
                value,
            } => step_digits(
                Digits {
                    radix,
                    emit,
                    remaining,
                    read,
                    selector,
                    value,
                },
                input,
                at_end,
                out,
            ),
            DecodeState::Done => Ok((DecodeState::Done, Advance::default())),
        }
    }
}

fn step_plain(
    quote: &QuoteType,
    input: &[u8],
    at_end: bool,
    out: &mut Vec<u8>,
) -> Result<(DecodeState, Advance), DecodeError> {
    let end = quote.end();
    let sym = quote.escapes().map(EscapeMap::symbol);
    let multiline = quote.flags().contains(QuoteFlags::MULTILINE);
    let mut adv = Advance {
        need: end.len().max(1),
        ..Advance::default()
    };

    let mut i = 0;
    while i < input.len() {
        let rest = &input[i..];
        if rest.starts_with(end) {
            adv.consumed = i;
            adv.need = 0;
            return Ok((DecodeState::Done, adv));
        }
        if rest.len() < end.len() && end.starts_with(rest) {
            // Possibly a split end mark.
            if at_end {
                return Err(DecodeError::Unterminated);
            }
            adv.consumed = i;
            return Ok((DecodeState::Plain, adv));
        }

        let byte = input[i];
        if Some(byte) == sym {
            adv.consumed = i + 1;
            adv.need = 1;
            return Ok((DecodeState::EscapeSelect, adv));
        }
        if byte == b'\n' {
            if !multiline {
                return Err(DecodeError::Newline);
            }
            adv.newlines += 1;
        }
        out.push(byte);
        i += 1;
    }

    if at_end {
        return Err(DecodeError::Unterminated);
    }
    adv.consumed = input.len();
    Ok((DecodeState::Plain, adv))
}

fn step_select(
    quote: &QuoteType,
    input: &[u8],
    at_end: bool,
    out: &mut Vec<u8>,
) -> Result<(DecodeState, Advance), DecodeError> {
    let (ch, len) = match utf8::decode(input) {
        Utf8::Char { ch, len } => (ch, len),
        Utf8::Incomplete { .. } if at_end => return Err(DecodeError::Unterminated),
        Utf8::Incomplete { need } => {
            return Ok((
                DecodeState::EscapeSelect,
                Advance {
                    need,
                    ..Advance::default()
                },
            ))
        }
        Utf8::Invalid => return Err(DecodeError::Encoding),
    };

    let selector = char::from_u32(ch).unwrap_or(char::REPLACEMENT_CHARACTER);
    let Some(map) = quote.escapes() else {
        return Err(DecodeError::InvalidEscape(selector));
    };
    let mut adv = Advance {
        consumed: len,
        need: quote.end().len().max(1),
        newlines: usize::from(ch == u32::from(b'\n')),
    };

    match map.get(ch) {
        None => {
            // Unknown escapes stay as written. An escaped newline is allowed
            // in single-line literals.
            out.push(map.symbol());
            out.extend_from_slice(&input[..len]);
            Ok((DecodeState::Plain, adv))
        }
        Some(EscapeKind::Fixed(bytes)) => {
            out.extend_from_slice(bytes);
            Ok((DecodeState::Plain, adv))
        }
        Some(&EscapeKind::Numeric {
            radix,
            max_digits,
            emit,
            seeded,
        }) => {
            let mut digits = Digits {
                radix,
                emit,
                remaining: max_digits,
                read: 0,
                selector,
                value: 0,
            };
            if seeded {
                let seed = u8::try_from(ch).ok().and_then(|b| radix.digit(b));
                if let Some(d) = seed {
                    digits.value = d;
                    digits.read = 1;
                }
            }
            if digits.remaining == 0 {
                digits.finish(out)?;
                return Ok((DecodeState::Plain, adv));
            }
            adv.need = usize::from(digits.remaining);
            Ok((digits.into_state(), adv))
        }
    }
}

#[derive(Clone, Copy)]
struct Digits {
    radix: Radix,
    emit: Emit,
    remaining: u8,
    read: u8,
    selector: char,
    value: u32,
}

impl Digits {
    fn into_state(self) -> DecodeState {
        DecodeState::EscapeDigits {
            radix: self.radix,
            emit: self.emit,
            remaining: self.remaining,
            read: self.read,
            selector: self.selector,
            value: self.value,
        }
    }

    fn finish(self, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        if self.read == 0 {
            return Err(DecodeError::InvalidEscape(self.selector));
        }
        match self.emit {
            Emit::Byte => out.push(self.value.to_le_bytes()[0]),
            Emit::Unicode => {
                utf8::encode(self.value, out).ok_or(DecodeError::InvalidEscape(self.selector))?;
            }
        }
        Ok(())
    }
}

fn step_digits(
    mut digits: Digits,
    input: &[u8],
    at_end: bool,
    out: &mut Vec<u8>,
) -> Result<(DecodeState, Advance), DecodeError> {
    let mut adv = Advance::default();
    for &byte in input {
        if digits.remaining == 0 {
            break;
        }
        let Some(d) = digits.radix.digit(byte) else {
            break;
        };
        digits.value = (digits.value << digits.radix.bits()) | d;
        digits.remaining -= 1;
        digits.read += 1;
        adv.consumed += 1;
    }

    let stopped_early = adv.consumed < input.len();
    if digits.remaining == 0 || stopped_early || at_end {
        digits.finish(out)?;
        adv.need = 1;
        return Ok((DecodeState::Plain, adv));
    }
    adv.need = usize::from(digits.remaining);
    Ok((digits.into_state(), adv))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
