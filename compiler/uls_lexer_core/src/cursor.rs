//! Byte cursor over a cooked text run.
//!
//! The runtime keeps cooked text in runs that end where an embedded literal
//! (or the end of the fill) begins. The cursor reads `0x00` past the end of
//! its run, so scanning loops stop there without explicit bounds checks.
//! Interior null bytes are told apart from the end by [`Cursor::is_eof`].

use crate::utf8;

/// Copyable cursor over one run of cooked bytes.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Cursor positioned at `pos` (clamped to the end).
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self {
            buf,
            pos: pos.min(buf.len()),
        }
    }

    /// Byte at the current position, `0x00` at the end.
    #[inline]
    pub fn current(&self) -> u8 {
        self.peek_at(0)
    }

    #[inline]
    pub fn peek(&self) -> u8 {
        self.peek_at(1)
    }

    #[inline]
    pub fn peek2(&self) -> u8 {
        self.peek_at(2)
    }

    /// Byte `n` positions ahead, `0x00` past the end.
    #[inline]
    pub fn peek_at(&self, n: usize) -> u8 {
        self.buf.get(self.pos + n).copied().unwrap_or(0)
    }

    #[inline]
    pub fn advance(&mut self) {
        self.advance_n(1);
    }

    #[inline]
    pub fn advance_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    /// Advance past one UTF-8 character (one byte if the lead is invalid).
    #[inline]
    pub fn advance_char(&mut self) {
        let width = utf8::width(self.current()).unwrap_or(1);
        self.advance_n(width);
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Unread bytes.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        &self.buf[start..end]
    }

    /// Bytes from `start` to the current position.
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        self.slice(start, self.pos)
    }

    /// Advance while `pred` holds for the current byte; returns the count.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while !self.is_eof() && pred(self.buf[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Advance to the next `byte`, or to the end if there is none.
    ///
    /// Returns `true` when the byte was found.
    pub fn eat_until(&mut self, byte: u8) -> bool {
        match memchr::memchr(byte, self.rest()) {
            Some(offset) => {
                self.pos += offset;
                true
            }
            None => {
                self.pos = self.buf.len();
                false
            }
        }
    }

    /// Advance to the next occurrence of `mark`, or to the end.
    ///
    /// Returns `true` when the mark was found.
    pub fn eat_until_mark(&mut self, mark: &[u8]) -> bool {
        match memchr::memmem::find(self.rest(), mark) {
            Some(offset) => {
                self.pos += offset;
                true
            }
            None => {
                self.pos = self.buf.len();
                false
            }
        }
    }

    #[inline]
    pub fn starts_with(&self, mark: &[u8]) -> bool {
        self.rest().starts_with(mark)
    }
}
