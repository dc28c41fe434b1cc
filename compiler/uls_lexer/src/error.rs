//! Runtime error types.
//!
//! A [`LexError`] pairs the location (source tag and line) with a
//! [`LexErrorKind`]. Recoverable kinds are reported as ERR tokens and
//! scanning continues after the offending input; fatal kinds also mark the
//! context as failed so later calls fail fast without touching the source.

use std::io;
use std::sync::Arc;

use uls_lexer_core::{DecodeError, TokenId};

/// A runtime error with its location.
#[derive(Debug, thiserror::Error)]
#[error("{tag}:{line}: {kind}")]
pub struct LexError {
    /// Tag of the source being read.
    pub tag: Arc<str>,
    /// Line where the error was detected.
    pub line: usize,
    pub kind: LexErrorKind,
}

/// What went wrong.
#[derive(Debug, thiserror::Error)]
pub enum LexErrorKind {
    // === Fatal ===
    #[error("unterminated literal")]
    UnterminatedLiteral,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("invalid escape sequence after `{0}`")]
    InvalidEscape(char),
    #[error("incorrect utf-8 format")]
    Encoding,
    #[error("read failed: {0}")]
    Io(#[source] io::Error),

    // === Recoverable ===
    #[error("too long identifier ({0} bytes)")]
    IdentifierTooLong(usize),
    #[error("unknown char `{}`", .0.escape_debug())]
    UnknownCharacter(char),
    #[error("expected token {expected}, found {found}")]
    Unexpected { expected: TokenId, found: TokenId },
    #[error("no token to unget")]
    NothingToUnget,
    #[error("token already ungot")]
    AlreadyUngot,
}

impl LexErrorKind {
    /// Whether the error leaves the source unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LexErrorKind::UnterminatedLiteral
                | LexErrorKind::UnterminatedComment
                | LexErrorKind::InvalidEscape(_)
                | LexErrorKind::Encoding
                | LexErrorKind::Io(_)
        )
    }
}

impl From<DecodeError> for LexErrorKind {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Unterminated | DecodeError::Newline => LexErrorKind::UnterminatedLiteral,
            DecodeError::InvalidEscape(ch) => LexErrorKind::InvalidEscape(ch),
            DecodeError::Encoding => LexErrorKind::Encoding,
        }
    }
}

impl From<io::Error> for LexErrorKind {
    fn from(err: io::Error) -> Self {
        LexErrorKind::Io(err)
    }
}

impl LexError {
    pub fn new(tag: Arc<str>, line: usize, kind: impl Into<LexErrorKind>) -> Self {
        Self {
            tag,
            line,
            kind: kind.into(),
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}
