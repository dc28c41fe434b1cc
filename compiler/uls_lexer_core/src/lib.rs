//! Lookup tables and literal decoding for the ULS lexer.
//!
//! This crate holds everything a tokenizer needs that does not touch input
//! buffering: character classes, token identities, the keyword hash table,
//! the one-char and multi-char operator tables, escape maps and the
//! resumable literal decoder. It has no `uls_*` dependencies.
//!
//! # Lookup tables
//!
//! | Key shape | Table | Lookup |
//! |-----------|-------|--------|
//! | identifier text | [`KeywordTable`] | hash chain |
//! | one punctuation char | [`OneCharTable`] | grouped dense arrays |
//! | operator text | [`TwoPlusTable`] | longest length first, binary search |

mod char_class;
mod cursor;
mod escape_map;
mod keyword_table;
mod literal;
mod onechar;
mod token;
mod twoplus;
pub mod utf8;

pub use char_class::{CharClass, CharTable, SYNTAX_TABLE_SIZE};
pub use cursor::Cursor;
pub use escape_map::{
    Emit, EscapeKind, EscapeMap, EscapeMapError, Radix, DEFAULT_ESCAPE_SYM, ESCAPE_CH_FIRST,
    ESCAPE_CH_LAST,
};
pub use keyword_table::{
    CaseMode, HashWeights, KeywordExport, KeywordStat, KeywordTable, DEFAULT_SLOTS,
};
pub use literal::{
    Advance, DecodeError, DecodeState, Decoded, LiteralAnalyzer, QuoteFlags, QuoteType,
};
pub use onechar::OneCharTable;
pub use token::{
    ArenaError, Reserved, ReservedIds, TokenArena, TokenDef, TokenId, TokenView, ViewId,
};
pub use twoplus::{TwoPlusError, TwoPlusTable, MAX_LEN as TWO_PLUS_MAX_LEN, MIN_LEN as TWO_PLUS_MIN_LEN};
