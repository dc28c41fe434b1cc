//! Configurable tokenizer runtime.
//!
//! A [`LexSpec`] describes a language's tokens: keywords, operators, quote
//! and comment types, number syntax and character classes. A [`Lexer`]
//! reads a stack of sources against it and returns token ids one at a time.
//!
//! # Pipeline
//!
//! ```text
//! Source ─► RawInput ─► filler ─► Fill (cooked text + literals) ─► dispatch ─► Token
//!                       │
//!                       └─ comments removed, literals decoded
//! ```
//!
//! The filler cooks raw bytes a chunk at a time: comments are replaced by
//! whitespace (their newlines kept) and literal strings are decoded into a
//! side buffer. The dispatch engine then scans the cooked text, so it never
//! sees a comment or an escape sequence.
//!
//! Recorded token streams ([`RecordedToken`]) enter the same context stack
//! and skip both stages.

mod context;
mod error;
mod fill;
mod input;
mod lexer;
mod log;
mod number;
pub mod presets;
mod record;
mod source;
mod spec;
mod token;

pub use error::{LexError, LexErrorKind};
pub use lexer::{Lexer, Peeked};
pub use log::{LogLevel, LogRecord, LogSink, MemorySink, TracingSink};
pub use number::{Lexeme, NumberInfo};
pub use record::{
    read_records, record_tokens, write_records, RecordError, RecordedToken, TokenSource,
};
pub use source::Source;
pub use spec::{
    CommentFlags, CommentType, LexSpec, LexSpecBuilder, NumberSyntax, QuoteDef, RadixPrefix,
    SpecError, COMMENT_MARK_MAX, MAX_COMMENT_TYPES, MAX_QUOTE_TYPES, MAX_RADIX_PREFIXES,
    MIN_LOOKAHEAD, QUOTE_MARK_MAX, RADIX_PREFIX_MAX,
};
pub use token::{Token, TokenKind};

pub use uls_lexer_core::{
    CaseMode, CharClass, EscapeKind, EscapeMap, HashWeights, KeywordExport, KeywordStat,
    LiteralAnalyzer, QuoteFlags, Reserved, TokenId, ViewId,
};
