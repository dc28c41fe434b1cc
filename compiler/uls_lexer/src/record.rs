//! Recorded token streams.
//!
//! A token stream is a header followed by [`RecordedToken`]s, encoded with
//! `bincode`. Pushed back through [`Lexer::push_tokens`] it replays without
//! character scanning, through the same context stack as text sources. A
//! LINENUM record only moves the current line.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use uls_lexer_core::{Reserved, TokenId};

use crate::lexer::Lexer;
use crate::number::{self, Lexeme};
use crate::source::Source;
use crate::spec::LexSpec;
use crate::token::{Token, TokenKind};

const MAGIC: [u8; 4] = *b"ULS\0";
const VERSION: u16 = 1;

/// One token of a recorded stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedToken {
    pub id: i32,
    pub lexeme: Vec<u8>,
    /// Source line; `0` keeps the current line.
    pub line: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u16,
    spec: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("token stream i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed token stream: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("not a token stream")]
    BadMagic,
    #[error("unsupported token stream version {0}")]
    Version(u16),
}

/// Write `records` made with the specification called `spec`.
pub fn write_records(
    mut out: impl Write,
    spec: &str,
    records: &[RecordedToken],
) -> Result<(), RecordError> {
    let header = Header {
        magic: MAGIC,
        version: VERSION,
        spec: spec.to_owned(),
    };
    bincode::serialize_into(&mut out, &header)?;
    bincode::serialize_into(&mut out, records)?;
    out.flush()?;
    Ok(())
}

/// Read a stream; returns the specification name and the records.
pub fn read_records(mut input: impl Read) -> Result<(String, Vec<RecordedToken>), RecordError> {
    let header: Header = bincode::deserialize_from(&mut input)?;
    if header.magic != MAGIC {
        return Err(RecordError::BadMagic);
    }
    if header.version != VERSION {
        return Err(RecordError::Version(header.version));
    }
    let records = bincode::deserialize_from(&mut input)?;
    Ok((header.spec, records))
}

/// Anything that produces tokens through a [`Lexer`].
///
/// Wrappers with their own token handling, such as
/// [`Css3Lexer`](crate::presets::Css3Lexer), implement it so their output
/// can be recorded.
pub trait TokenSource {
    fn next_token(&mut self) -> TokenId;

    /// Lexer holding the token just returned.
    fn lexer(&self) -> &Lexer;
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> TokenId {
        self.next()
    }

    fn lexer(&self) -> &Lexer {
        self
    }
}

/// Drain `source` up to EOI. EOF tokens are left out.
#[tracing::instrument(level = "debug", skip_all)]
pub fn record_tokens<S: TokenSource + ?Sized>(source: &mut S) -> Vec<RecordedToken> {
    let spec = source.lexer().spec();
    let (eoi, eof) = (spec.id(Reserved::Eoi), spec.id(Reserved::Eof));
    let mut records = Vec::new();
    loop {
        let id = source.next_token();
        if id == eoi {
            break;
        }
        if id == eof {
            continue;
        }
        let token = source.lexer().token();
        records.push(RecordedToken {
            id: id.0,
            lexeme: token.lexeme().to_vec(),
            line: u32::try_from(token.line()).unwrap_or(u32::MAX),
        });
    }
    tracing::debug!(records = records.len(), "recorded");
    records
}

impl Lexer {
    /// Replay `records` before continuing with the current source.
    pub fn push_tokens(&mut self, tag: &str, records: impl IntoIterator<Item = RecordedToken>) {
        self.push(Source::tokens(tag, records));
    }
}

/// Rebuild a token from a record, classifying it against `spec`.
pub(crate) fn to_token(spec: &LexSpec, rec: &RecordedToken, line: usize) -> Token {
    let id = TokenId(rec.id);
    let view = spec.arena().find_by_id(id);
    let kind = if id == spec.id(Reserved::Number) {
        number_kind(spec, &rec.lexeme)
    } else if spec.quote_by_id(id).is_some() {
        TokenKind::Quote
    } else if id == spec.id(Reserved::Id) || spec.keywords().find(&rec.lexeme).is_some() {
        TokenKind::Word
    } else {
        TokenKind::Plain
    };
    Token::new(id, view, &rec.lexeme, line, kind)
}

fn number_kind(spec: &LexSpec, lexeme: &[u8]) -> TokenKind {
    let (sign, body) = match lexeme.split_first() {
        Some((b'-', body)) => (Some(b'-'), body),
        _ => (None, lexeme),
    };
    let mut out = Lexeme::new();
    out.extend(sign);
    match number::scan(spec.numbers(), body, &mut out) {
        Some(scanned) => TokenKind::Number(scanned.info),
        None => TokenKind::Plain,
    }
}
