//! Character-level access between tokens.
//!
//! Handlers for context-dependent syntax (such as the body of CSS `url(...)`)
//! read raw characters after the current token. A literal is never split:
//! at its position these calls report [`Peeked::Quote`] and leave it for
//! [`Lexer::next`].

use uls_lexer_core::{utf8, TokenId};

use super::Lexer;
use crate::context::{Ahead, Input, Pending};
use crate::error::LexErrorKind;

/// What lies at the current input position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Peeked {
    /// A character; whitespace other than tab and newline reads as `' '`.
    Char(char),
    /// A literal string of the given token id.
    Quote(TokenId),
    /// An ungot or recorded token.
    Token(TokenId),
    /// End of the current source.
    Eof,
    /// Nothing is left on the stack.
    Eoi,
}

enum Probe {
    Peeked(Peeked),
    Error(LexErrorKind),
}

impl Lexer {
    /// Character at the current position, without consuming it.
    pub fn peek_char(&mut self) -> Peeked {
        self.char_at(false)
    }

    /// Consume and return the character at the current position.
    ///
    /// Literals, tokens and the end of input are reported but not consumed.
    pub fn get_char(&mut self) -> Peeked {
        self.char_at(true)
    }

    fn char_at(&mut self, consume: bool) -> Peeked {
        if self.eoi {
            return Peeked::Eoi;
        }
        let depth = self.stack.len();
        let spec = &*self.spec;
        let last = depth - 1;
        let ctx = &mut self.stack[last];
        if ctx.failed {
            return Peeked::Eof;
        }
        let probe = match ctx.prepare(spec) {
            Err(kind) => Probe::Error(kind),
            Ok(Ahead::Literal(view)) => Probe::Peeked(Peeked::Quote(spec.arena().id_of(view))),
            Ok(Ahead::Token) => match ctx.pending.front() {
                Some(Pending::Token { token, .. }) => Probe::Peeked(Peeked::Token(token.id)),
                _ => Probe::Peeked(Peeked::Eof),
            },
            Ok(Ahead::Text) => {
                let (fill, line, delta) = ctx.active();
                *line += std::mem::take(delta);
                let rest = fill.rest_of_run();
                let (ch, len) = match utf8::decode(rest) {
                    utf8::Utf8::Char { ch, len } => (ch, len),
                    utf8::Utf8::Incomplete { .. } | utf8::Utf8::Invalid => {
                        (u32::from(char::REPLACEMENT_CHARACTER), 1)
                    }
                };
                let ch = char::from_u32(ch).unwrap_or(char::REPLACEMENT_CHARACTER);
                if consume {
                    fill.pos += len;
                    if ch == '\n' {
                        *line += 1;
                    }
                }
                let blank = u8::try_from(ch).is_ok_and(|b| spec.chars().is_space(b));
                let ch = if blank && ch != '\t' && ch != '\n' {
                    ' '
                } else {
                    ch
                };
                Probe::Peeked(Peeked::Char(ch))
            }
            Ok(Ahead::End) => match &ctx.input {
                Input::Tokens(records) if !records.is_empty() => {
                    Probe::Peeked(Peeked::Token(TokenId(records[0].id)))
                }
                _ if depth > 1 || ctx.want_eof => Probe::Peeked(Peeked::Eof),
                _ => Probe::Peeked(Peeked::Eoi),
            },
        };
        match probe {
            Probe::Peeked(peeked) => peeked,
            Probe::Error(kind) => {
                self.raise(kind);
                Peeked::Eof
            }
        }
    }

    /// Skip whitespace up to the next character, literal or token.
    pub fn skip_blanks(&mut self) {
        let spec = &*self.spec;
        let last = self.stack.len() - 1;
        let ctx = &mut self.stack[last];
        if ctx.failed || self.eoi {
            return;
        }
        loop {
            match ctx.prepare(spec) {
                Ok(Ahead::Text) => {
                    let (fill, line, delta) = ctx.active();
                    *line += std::mem::take(delta);
                    let rest = fill.rest_of_run();
                    let blanks = rest
                        .iter()
                        .take_while(|&&b| spec.chars().is_space(b))
                        .count();
                    let len = rest.len();
                    *line += memchr::memchr_iter(b'\n', &rest[..blanks]).count();
                    fill.pos += blanks;
                    if blanks < len {
                        return;
                    }
                }
                Ok(_) => return,
                Err(kind) => {
                    ctx.fill_error = Some(kind);
                    return;
                }
            }
        }
    }
}
