//! Token dispatch over cooked text.
//!
//! Order of tests at the cursor, after whitespace is skipped:
//!
//! 1. end of run: the run's literal becomes a quote token;
//! 2. a digit (or `.digit`) starts a number;
//! 3. an identifier-first character starts an identifier or keyword;
//! 4. a multi-char token, longest match;
//! 5. a one-char token, anonymous for unregistered ASCII punctuation.
//!
//! A `-` directly before a digit joins the number unless signed numbers are
//! turned off; with minus folding it also joins a following identifier.
//! Non-ASCII characters registered as operators never start or
//! continue identifiers.

use uls_lexer_core::{utf8, CharClass, Cursor, Reserved, TokenId};

use crate::error::LexErrorKind;
use crate::fill::Fill;
use crate::number::{self, Lexeme};
use crate::spec::LexSpec;
use crate::token::{Token, TokenKind};

pub(super) enum Scan {
    Token(Token),
    /// The fill has no more runs.
    Exhausted,
    /// The offending input was consumed.
    Error(LexErrorKind),
}

/// Scan the next token of `fill`.
pub(super) fn scan(spec: &LexSpec, fill: &mut Fill, line: &mut usize, delta: &mut usize) -> Scan {
    *line += std::mem::take(delta);
    loop {
        let rest = fill.rest_of_run();
        let blanks = rest
            .iter()
            .take_while(|&&b| spec.chars().is_space(b))
            .count();
        *line += memchr::memchr_iter(b'\n', &rest[..blanks]).count();
        fill.pos += blanks;
        if fill.pos < fill.run_end() {
            break;
        }
        if fill.is_exhausted() {
            return Scan::Exhausted;
        }
        if let Some(literal) = fill.next_seg() {
            *delta = literal.newlines;
            return Scan::Token(Token::of_view(
                spec,
                literal.view,
                fill.literal_text(&literal),
                *line,
                TokenKind::Quote,
            ));
        }
    }

    let (scan, used) = dispatch(spec, fill.cursor(), *line);
    fill.pos += used;
    if let Scan::Token(token) = &scan {
        if token.lexeme.as_slice() == b"\n" && token.kind == TokenKind::Plain {
            *delta = 1;
        }
    }
    scan
}

/// Scan one token at the cursor; returns it with the bytes it used.
fn dispatch(spec: &LexSpec, cur: Cursor<'_>, line: usize) -> (Scan, usize) {
    let chars = spec.chars();
    let first = cur.current();
    let neg = first == b'-';
    let minus = usize::from(neg);
    let body = &cur.rest()[minus..];

    if (!neg || spec.signed_numbers()) && starts_number(spec, body) {
        let mut lexeme = Lexeme::new();
        if minus == 1 {
            lexeme.push(b'-');
        }
        if let Some(scanned) = number::scan(spec.numbers(), body, &mut lexeme) {
            let token = Token::reserved(spec, Reserved::Number, &lexeme, line);
            let token = Token {
                kind: TokenKind::Number(scanned.info),
                ..token
            };
            return (Scan::Token(token), minus + scanned.len);
        }
    }

    let minus = usize::from(neg && spec.fold_minus());
    let body = &cur.rest()[minus..];
    if let Some(len) = identifier_len(spec, body) {
        let used = minus + len;
        let lexeme = &cur.rest()[..used];
        let (max_bytes, max_chars) = spec.id_limits();
        let too_long = max_bytes.is_some_and(|max| used > max)
            || max_chars.is_some_and(|max| utf8::char_count(lexeme) > max);
        if too_long {
            return (Scan::Error(LexErrorKind::IdentifierTooLong(used)), used);
        }
        let token = match spec.keywords().find(lexeme) {
            Some(def) => Token::of_view(spec, def.view, lexeme, line, TokenKind::Word),
            None => Token::of_view(
                spec,
                spec.reserved().view(Reserved::Id),
                lexeme,
                line,
                TokenKind::Word,
            ),
        };
        return (Scan::Token(token), used);
    }

    let rest = cur.rest();
    if chars.class_of_byte(first).contains(CharClass::TWO_PLUS) {
        if let Some(def) = spec.twoplus().find(chars, rest) {
            let len = def.bytes().len();
            let token = Token::of_view(spec, def.view, &rest[..len], line, TokenKind::Plain);
            return (Scan::Token(token), len);
        }
    }

    if first.is_ascii() {
        if !chars.class_of_byte(first).contains(CharClass::ONE_CHAR) {
            return (
                Scan::Error(LexErrorKind::UnknownCharacter(char::from(first))),
                1,
            );
        }
        let token = match spec.onechars().find(u32::from(first)) {
            Some(view) => Token::of_view(spec, view, &rest[..1], line, TokenKind::Plain),
            None => Token::new(
                TokenId::from_char(u32::from(first)),
                None,
                &rest[..1],
                line,
                TokenKind::Plain,
            ),
        };
        return (Scan::Token(token), 1);
    }

    match utf8::decode(rest) {
        utf8::Utf8::Char { ch, len } => match spec.onechars().find(ch) {
            Some(view) => (
                Scan::Token(Token::of_view(
                    spec,
                    view,
                    &rest[..len],
                    line,
                    TokenKind::Plain,
                )),
                len,
            ),
            None => (
                Scan::Error(LexErrorKind::UnknownCharacter(
                    char::from_u32(ch).unwrap_or(char::REPLACEMENT_CHARACTER),
                )),
                len,
            ),
        },
        utf8::Utf8::Incomplete { .. } | utf8::Utf8::Invalid => {
            (Scan::Error(LexErrorKind::Encoding), 1)
        }
    }
}

fn starts_number(spec: &LexSpec, body: &[u8]) -> bool {
    match body {
        [b, ..] if spec.chars().class_of_byte(*b).contains(CharClass::DIGIT) => true,
        [b'.', next, ..] => spec.numbers().leading_dot && next.is_ascii_digit(),
        _ => false,
    }
}

/// A non-ASCII character registered as a one-char or multi-char token.
fn is_operator(spec: &LexSpec, ch: u32, text: &[u8]) -> bool {
    spec.onechars().find(ch).is_some() || spec.twoplus().find(spec.chars(), text).is_some()
}

/// Length of the identifier at the start of `text`.
fn identifier_len(spec: &LexSpec, text: &[u8]) -> Option<usize> {
    let chars = spec.chars();
    let mut pos = 0;
    while pos < text.len() {
        let byte = text[pos];
        let wanted = if pos == 0 {
            CharClass::ID_FIRST
        } else {
            CharClass::ID
        };
        let len = if byte.is_ascii() {
            if !chars.class_of_byte(byte).contains(wanted) {
                break;
            }
            1
        } else {
            let utf8::Utf8::Char { ch, len } = utf8::decode(&text[pos..]) else {
                break;
            };
            if !chars.class_of(ch).contains(wanted) || is_operator(spec, ch, &text[pos..]) {
                break;
            }
            len
        };
        pos += len;
    }
    (pos > 0).then_some(pos)
}
