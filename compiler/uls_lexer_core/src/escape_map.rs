//! Escape maps for quoted literals.
//!
//! An [`EscapeMap`] maps the character following the escape symbol to
//! either a fixed replacement or a numeric escape. Only printable ASCII
//! (`0x21..=0x7E`) can be registered; any other character after the escape
//! symbol, and any printable character without a mapping, is copied
//! verbatim together with the escape symbol.

/// First character that may follow the escape symbol.
pub const ESCAPE_CH_FIRST: u32 = 0x21;
/// Last character that may follow the escape symbol.
pub const ESCAPE_CH_LAST: u32 = 0x7E;
const MAP_SIZE: usize = (ESCAPE_CH_LAST - ESCAPE_CH_FIRST + 1) as usize;

/// Default escape symbol.
pub const DEFAULT_ESCAPE_SYM: u8 = b'\\';

/// Digit alphabet of a numeric escape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Radix {
    Octal,
    Hex,
}

impl Radix {
    #[inline]
    pub fn digit(self, byte: u8) -> Option<u32> {
        match self {
            Radix::Octal => matches!(byte, b'0'..=b'7').then(|| u32::from(byte - b'0')),
            Radix::Hex => char::from(byte).to_digit(16),
        }
    }

    #[inline]
    pub fn bits(self) -> u32 {
        match self {
            Radix::Octal => 3,
            Radix::Hex => 4,
        }
    }
}

/// How the value of a numeric escape is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Emit {
    /// UTF-8 encoding of the code point.
    Unicode,
    /// A single raw byte (value truncated to 8 bits).
    Byte,
}

/// Meaning of one escape character.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EscapeKind {
    /// Emit these bytes.
    Fixed(Box<[u8]>),
    /// Read up to `max_digits` digits and emit their value.
    Numeric {
        radix: Radix,
        max_digits: u8,
        emit: Emit,
        /// The escape character itself is the first digit (`\101`).
        seeded: bool,
    },
}

/// Errors raised when registering an escape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EscapeMapError {
    #[error("escape character {0:#04x} is outside the printable ASCII range")]
    NotEscapable(u32),
    #[error("escape symbol {0:#04x} must be printable ASCII")]
    BadSymbol(u8),
}

/// Escape character table with its escape symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EscapeMap {
    sym: u8,
    entries: Vec<Option<EscapeKind>>,
}

impl Default for EscapeMap {
    fn default() -> Self {
        Self::verbatim()
    }
}

impl EscapeMap {
    /// Map with no entries: every escape is copied verbatim.
    pub fn verbatim() -> Self {
        Self {
            sym: DEFAULT_ESCAPE_SYM,
            entries: vec![None; MAP_SIZE],
        }
    }

    /// Only the escape symbol escapes itself.
    pub fn verbatim_moderate() -> Self {
        let mut map = Self::verbatim();
        map.set_fixed_unchecked(DEFAULT_ESCAPE_SYM, &[DEFAULT_ESCAPE_SYM]);
        map
    }

    /// `\n \r \t \b \a \v \f`.
    pub fn legacy() -> Self {
        let mut map = Self::verbatim();
        for (ch, out) in [
            (b'n', b'\n'),
            (b'r', b'\r'),
            (b't', b'\t'),
            (b'b', 0x08),
            (b'a', 0x07),
            (b'v', 0x0B),
            (b'f', 0x0C),
        ] {
            map.set_fixed_unchecked(ch, &[out]);
        }
        map
    }

    /// Legacy plus quotes, backslash, octal `\ooo` and `\xHH` as raw bytes.
    pub fn legacy_full() -> Self {
        let mut map = Self::legacy();
        for ch in [b'"', b'\'', b'\\'] {
            map.set_fixed_unchecked(ch, &[ch]);
        }
        for ch in b'0'..=b'7' {
            map.set_unchecked(
                ch,
                EscapeKind::Numeric {
                    radix: Radix::Octal,
                    max_digits: 2,
                    emit: Emit::Byte,
                    seeded: true,
                },
            );
        }
        map.set_unchecked(
            b'x',
            EscapeKind::Numeric {
                radix: Radix::Hex,
                max_digits: 2,
                emit: Emit::Byte,
                seeded: false,
            },
        );
        map
    }

    /// `\n \t \r \' \" \\ \0`, `\uXXXX` and `\UXXXXXXXX` as UTF-8.
    pub fn modern() -> Self {
        let mut map = Self::verbatim();
        for (ch, out) in [
            (b'n', b'\n'),
            (b't', b'\t'),
            (b'r', b'\r'),
            (b'\'', b'\''),
            (b'"', b'"'),
            (b'\\', b'\\'),
            (b'0', 0x00),
        ] {
            map.set_fixed_unchecked(ch, &[out]);
        }
        for (ch, digits) in [(b'u', 4), (b'U', 8)] {
            map.set_unchecked(
                ch,
                EscapeKind::Numeric {
                    radix: Radix::Hex,
                    max_digits: digits,
                    emit: Emit::Unicode,
                    seeded: false,
                },
            );
        }
        map
    }

    /// Use `sym` instead of `\` as the escape symbol.
    ///
    /// A fixed mapping of the old symbol to itself moves to the new symbol.
    pub fn with_symbol(mut self, sym: u8) -> Result<Self, EscapeMapError> {
        if Self::slot(u32::from(sym)).is_none() {
            return Err(EscapeMapError::BadSymbol(sym));
        }
        let old = self.sym;
        if let Some(EscapeKind::Fixed(bytes)) = self.get(u32::from(old)) {
            if bytes.as_ref() == [old] {
                self.entries[Self::slot_unchecked(old)] = None;
                self.set_fixed_unchecked(sym, &[sym]);
            }
        }
        self.sym = sym;
        Ok(self)
    }

    #[inline]
    pub fn symbol(&self) -> u8 {
        self.sym
    }

    /// Whether `ch` can be registered as an escape character.
    #[inline]
    pub fn is_escapable(ch: u32) -> bool {
        (ESCAPE_CH_FIRST..=ESCAPE_CH_LAST).contains(&ch)
    }

    #[inline]
    fn slot(ch: u32) -> Option<usize> {
        Self::is_escapable(ch).then(|| (ch - ESCAPE_CH_FIRST) as usize)
    }

    #[inline]
    fn slot_unchecked(ch: u8) -> usize {
        usize::from(ch) - ESCAPE_CH_FIRST as usize
    }

    fn set_unchecked(&mut self, ch: u8, kind: EscapeKind) {
        self.entries[Self::slot_unchecked(ch)] = Some(kind);
    }

    fn set_fixed_unchecked(&mut self, ch: u8, out: &[u8]) {
        self.set_unchecked(ch, EscapeKind::Fixed(out.into()));
    }

    /// Register or replace the meaning of `ch`.
    pub fn set(&mut self, ch: u32, kind: EscapeKind) -> Result<(), EscapeMapError> {
        let slot = Self::slot(ch).ok_or(EscapeMapError::NotEscapable(ch))?;
        self.entries[slot] = Some(kind);
        Ok(())
    }

    /// Remove the meaning of `ch`.
    pub fn remove(&mut self, ch: u32) -> Option<EscapeKind> {
        Self::slot(ch).and_then(|slot| self.entries[slot].take())
    }

    /// Meaning of `ch`, if registered.
    #[inline]
    pub fn get(&self, ch: u32) -> Option<&EscapeKind> {
        Self::slot(ch).and_then(|slot| self.entries[slot].as_ref())
    }

    /// Preset by name: `legacy`, `legacy_full`, `modern`, `verbatim`,
    /// `verbatim_moderate`.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "legacy" => Some(Self::legacy()),
            "legacy_full" => Some(Self::legacy_full()),
            "modern" => Some(Self::modern()),
            "verbatim" => Some(Self::verbatim()),
            "verbatim_moderate" => Some(Self::verbatim_moderate()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
