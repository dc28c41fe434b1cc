// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end lexer scenarios through the public API.
//!
//! # Running
//!
//! ```bash
//! cargo test -p uls_lexer --test scenarios
//! ```

use std::io::{self, Read};
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use uls_lexer::{
    read_records, record_tokens, write_records, CommentFlags, EscapeMap, LexSpec, LexSpecBuilder,
    Lexer, LogLevel, MemorySink, Peeked, QuoteDef, QuoteFlags, Reserved, Source, TokenId,
};

const ABC: TokenId = TokenId(300);
const SHL: TokenId = TokenId(301);
const SHL_EQ: TokenId = TokenId(302);
const LT: TokenId = TokenId(60);

fn c_like() -> LexSpecBuilder {
    LexSpec::builder("c-like")
        .token("ABC", "abc", ABC)
        .token("SHL", "<<", SHL)
        .token("SHL_EQ", "<<=", SHL_EQ)
        .token("LT", "<", LT)
        .quote(QuoteDef::new("\"", "\"").escapes(EscapeMap::legacy_full()))
        .comment("/*", "*/", CommentFlags::empty())
        .line_comment("//")
}

fn lexer(text: &str) -> Lexer {
    let mut lexer = Lexer::new(c_like().build().unwrap());
    lexer.push_str("input", text);
    lexer
}

/// Reader returning at most `n` bytes per call.
struct Trickle(io::Cursor<Vec<u8>>, usize);

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.1);
        self.0.read(&mut buf[..n])
    }
}

/// Tokens as `(id, text, line)` up to EOI.
fn collect(lexer: &mut Lexer) -> Vec<(TokenId, String, usize)> {
    let eoi = lexer.spec().id(Reserved::Eoi);
    let mut out = Vec::new();
    loop {
        let id = lexer.next();
        if id == eoi {
            return out;
        }
        out.push((id, lexer.lexeme_text().into_owned(), lexer.line()));
    }
}

// === Core scenarios ===

#[test]
fn registered_keyword_beats_identifier() {
    let mut lx = lexer("abc abcd");
    assert_eq!(lx.next(), ABC);
    assert_eq!(lx.next(), lx.spec().id(Reserved::Id));
}

#[test]
fn longest_operator_consumes_three_bytes() {
    let mut lx = lexer("<<=x");
    assert_eq!(lx.next(), SHL_EQ);
    assert_eq!(lx.lexeme(), b"<<=");
    assert_eq!(lx.peek_char(), Peeked::Char('x'));
}

#[test]
fn hex_escape_decodes() {
    let mut lx = lexer(r#""a\x41b""#);
    assert_eq!(lx.next(), TokenId(34));
    assert_eq!(lx.lexeme(), b"aAb");
}

#[test]
fn number_stops_before_unknown_suffix() {
    let mut lx = lexer("123abc");
    assert_eq!(lx.next(), lx.spec().id(Reserved::Number));
    assert_eq!(lx.lexeme(), b"123");
    assert_eq!(lx.next(), ABC);
}

#[test]
fn nested_source_restores_outer_position() {
    let mut lx = lexer("one\ntwo\nthree");
    lx.next();
    lx.next();
    let (line, tag) = (lx.line(), lx.tag().to_owned());
    lx.push(Source::text("nested", "x\ny\nz").want_eof(true));
    let nested = collect_until_eof(&mut lx);
    assert_eq!(nested, vec!["x", "y", "z"]);
    assert_eq!(lx.eof_tag(), Some((3, "nested")));
    assert_eq!((lx.line(), lx.tag()), (3, "nested"));
    lx.next();
    assert_eq!(lx.lexeme(), b"three");
    assert_eq!(lx.tag(), tag);
    assert_eq!(lx.line(), line + 1);
}

fn collect_until_eof(lx: &mut Lexer) -> Vec<String> {
    let eof = lx.spec().id(Reserved::Eof);
    let mut out = Vec::new();
    while lx.next() != eof {
        out.push(lx.lexeme_text().into_owned());
    }
    out
}

// === Chunked input ===

#[test]
fn chunk_boundaries_do_not_change_tokens() {
    let mut text = String::new();
    for i in 0..400 {
        text.push_str(&format!("abc x{i} /* c{i}\n */ \"s\\\"{i}\" <<= {i}\n"));
    }
    let whole = collect(&mut lexer(&text));
    assert_eq!(whole.len(), 400 * 5);

    for step in [1, 3, 7, 1000] {
        let mut lx = Lexer::new(c_like().build().unwrap());
        lx.push(Source::reader(
            "trickle",
            Trickle(io::Cursor::new(text.clone().into_bytes()), step),
        ));
        assert_eq!(collect(&mut lx), whole, "chunk size {step}");
    }
}

#[test]
fn line_numbers_across_chunks() {
    let text = "x\n".repeat(3000);
    let tokens = collect(&mut lexer(&text));
    assert_eq!(tokens.len(), 3000);
    assert!(tokens.iter().enumerate().all(|(i, t)| t.2 == i + 1));
}

// === Quote flags ===

#[test]
fn quote_flag_behaviour() {
    let spec = LexSpec::builder("flags")
        .quote(QuoteDef::new("<%", "").flags(QuoteFlags::NOTHING))
        .quote(QuoteDef::new("@", "").flags(QuoteFlags::OPEN).id(TokenId(400)))
        .quote(
            QuoteDef::new("[[", "]]")
                .flags(QuoteFlags::ASYMMETRIC | QuoteFlags::MULTILINE)
                .id(TokenId(401)),
        )
        .build()
        .unwrap();
    let mut lx = Lexer::new(spec);
    lx.push_str("t", "<% a @ [[two\nlines]] b");
    let tokens = collect(&mut lx);
    let id = lx.spec().id(Reserved::Id);
    assert_eq!(
        tokens,
        vec![
            (id, "a".to_owned(), 1),
            (TokenId(400), String::new(), 1),
            (TokenId(401), "two\nlines".to_owned(), 1),
            (id, "b".to_owned(), 2),
        ]
    );
}

#[test]
fn single_line_quote_rejects_newline() {
    let mut lx = lexer("\"broken\nstring\"");
    assert_eq!(lx.next(), lx.spec().id(Reserved::Err));
    assert!(lx.last_error().unwrap().is_fatal());
}

// === Comments ===

#[test]
fn nested_and_column0_comments() {
    let spec = LexSpec::builder("comments")
        .comment("(*", "*)", CommentFlags::NESTED)
        .comment("#", "\n", CommentFlags::COLUMN0)
        .build()
        .unwrap();
    let mut lx = Lexer::new(spec);
    lx.push_str("t", "(* a (* b *) c *) x\n# hidden\ny # shown");
    let texts: Vec<String> = collect(&mut lx).into_iter().map(|t| t.1).collect();
    assert_eq!(texts, vec!["x", "y", "#", "shown"]);
}

// === Replay ===

#[test]
fn recorded_stream_survives_a_file_round_trip() {
    let mut lx = lexer("abc <<= 12\n\"q\" <");
    let records = record_tokens(&mut lx);

    let mut file = Vec::new();
    write_records(&mut file, lx.spec().name(), &records).unwrap();
    let (name, back) = read_records(io::Cursor::new(file)).unwrap();
    assert_eq!(name, "c-like");

    let mut replay = Lexer::new(c_like().build().unwrap());
    replay.push_tokens("replay", back);
    let replayed = collect(&mut replay);
    let original = collect(&mut lexer("abc <<= 12\n\"q\" <"));
    assert_eq!(replayed, original);
}

#[test]
fn replay_supports_unget() {
    let mut lx = lexer("abc <");
    let records = record_tokens(&mut lx);
    let mut replay = Lexer::new(c_like().build().unwrap());
    replay.push_tokens("replay", records);
    assert_eq!(replay.next(), ABC);
    replay.unget_token().unwrap();
    assert_eq!(replay.next(), ABC);
    assert_eq!(replay.next(), LT);
}

// === Sharing ===

#[test]
fn lexers_share_a_spec_and_a_sink_across_threads() {
    let spec = c_like().non_ascii_ids(false).build().unwrap();
    let sink = Arc::new(MemorySink::new(LogLevel::Warn));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let spec = Arc::clone(&spec);
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                let mut lx = Lexer::with_sink(spec, sink);
                lx.push_str(&format!("t{i}"), "abc € <<");
                collect(&mut lx).len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
    assert_eq!(sink.records().len(), 4);
}
