//! Per-character classification table.
//!
//! Every ASCII byte carries a set of [`CharClass`] flags describing which
//! token kinds it may start or continue. An empty set means whitespace.
//!
//! # Non-ASCII
//!
//! Code points at or above `0x80` are not stored in the table. They are
//! treated as identifier-capable and as possible starts of comment, quote,
//! multi-char and one-char tokens, so that configured non-ASCII marks and
//! operators are always probed. [`CharTable::set_non_ascii_ids`] turns the
//! identifier part off for languages that only allow ASCII names.

use bitflags::bitflags;

/// Number of entries in the classification table (ASCII only).
pub const SYNTAX_TABLE_SIZE: usize = 128;

bitflags! {
    /// Lexical roles a character may play.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CharClass: u8 {
        /// Starts a number.
        const DIGIT = 0x01;
        /// May form a one-char token.
        const ONE_CHAR = 0x02;
        /// May start a multi-char token.
        const TWO_PLUS = 0x04;
        /// May start a quote mark.
        const QUOTE = 0x08;
        /// May start an identifier.
        const ID_FIRST = 0x10;
        /// May continue an identifier.
        const ID = 0x20;
        /// May start a comment mark.
        const COMMENT = 0x80;
    }
}

/// Classes assumed for every code point `>= 0x80`.
const NON_ASCII: CharClass = CharClass::ONE_CHAR
    .union(CharClass::TWO_PLUS)
    .union(CharClass::QUOTE)
    .union(CharClass::COMMENT);

/// Character classification for one lexical specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharTable {
    table: [CharClass; SYNTAX_TABLE_SIZE],
    non_ascii_ids: bool,
}

impl Default for CharTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CharTable {
    /// Table with the conventional defaults.
    ///
    /// Letters and `_` start and continue identifiers, digits start numbers
    /// and continue identifiers, printable punctuation may form one-char
    /// tokens. Control characters and space are whitespace.
    pub fn new() -> Self {
        let mut table = [CharClass::empty(); SYNTAX_TABLE_SIZE];
        for (byte, class) in (0u8..).zip(table.iter_mut()) {
            *class = match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => CharClass::ID_FIRST | CharClass::ID,
                b'0'..=b'9' => CharClass::DIGIT | CharClass::ID,
                b'!'..=b'~' => CharClass::ONE_CHAR,
                _ => CharClass::empty(),
            };
        }
        Self {
            table,
            non_ascii_ids: true,
        }
    }

    /// Table in which every ASCII byte is whitespace.
    pub fn blank() -> Self {
        Self {
            table: [CharClass::empty(); SYNTAX_TABLE_SIZE],
            non_ascii_ids: true,
        }
    }

    /// Classes of a code point.
    #[inline]
    pub fn class_of(&self, ch: u32) -> CharClass {
        match usize::try_from(ch) {
            Ok(idx) if idx < SYNTAX_TABLE_SIZE => self.table[idx],
            _ => self.non_ascii_class(),
        }
    }

    /// Classes of the character whose first UTF-8 byte is `byte`.
    #[inline]
    pub fn class_of_byte(&self, byte: u8) -> CharClass {
        if byte.is_ascii() {
            self.table[usize::from(byte)]
        } else {
            self.non_ascii_class()
        }
    }

    #[inline]
    fn non_ascii_class(&self) -> CharClass {
        if self.non_ascii_ids {
            NON_ASCII | CharClass::ID_FIRST | CharClass::ID
        } else {
            NON_ASCII
        }
    }

    /// Returns `true` for ASCII bytes without any class.
    #[inline]
    pub fn is_space(&self, byte: u8) -> bool {
        byte.is_ascii() && self.table[usize::from(byte)].is_empty()
    }

    /// Add classes to an ASCII byte. Non-ASCII bytes are ignored.
    pub fn insert(&mut self, byte: u8, class: CharClass) {
        if byte.is_ascii() {
            self.table[usize::from(byte)].insert(class);
        }
    }

    /// Remove classes from an ASCII byte. Non-ASCII bytes are ignored.
    pub fn remove(&mut self, byte: u8, class: CharClass) {
        if byte.is_ascii() {
            self.table[usize::from(byte)].remove(class);
        }
    }

    /// Replace the classes of an ASCII byte. Non-ASCII bytes are ignored.
    pub fn set(&mut self, byte: u8, class: CharClass) {
        if byte.is_ascii() {
            self.table[usize::from(byte)] = class;
        }
    }

    /// Whether code points `>= 0x80` may appear in identifiers.
    pub fn set_non_ascii_ids(&mut self, allowed: bool) {
        self.non_ascii_ids = allowed;
    }
}
