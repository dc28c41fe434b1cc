//! Ready-made specifications.
//!
//! [`css3`] configures a builder for CSS3 style sheets. The body of
//! `url(...)` is not tokenizable by ordinary rules (`url(../a.png)`), so
//! [`Css3Lexer`] reads it character by character and returns it as one
//! [`CSS_PATH`] token.

use std::sync::Arc;

use uls_lexer_core::{EscapeMap, TokenId};

use crate::lexer::{Lexer, Peeked};
use crate::record::TokenSource;
use crate::source::Source;
use crate::spec::{CommentFlags, LexSpec, LexSpecBuilder, QuoteDef};

pub const CSS_URL: TokenId = TokenId(256);
pub const CSS_PATH: TokenId = TokenId(257);
pub const CSS_DCOLON: TokenId = TokenId(258);
pub const CSS_INCLUDES: TokenId = TokenId(259);
pub const CSS_DASHMATCH: TokenId = TokenId(260);
pub const CSS_PREFIXMATCH: TokenId = TokenId(261);
pub const CSS_SUFFIXMATCH: TokenId = TokenId(262);
pub const CSS_SUBSTRMATCH: TokenId = TokenId(263);

/// Length units taken as number suffixes.
const CSS_UNITS: &[&str] = &[
    "px", "em", "rem", "ex", "ch", "vw", "vh", "vmin", "vmax", "cm", "mm", "in", "pt", "pc", "deg",
    "rad", "turn", "s", "ms", "dpi", "fr",
];

/// Builder configured for CSS3.
pub fn css3() -> LexSpecBuilder {
    let mut builder = LexSpec::builder("css3")
        .id_chars("-")
        .fold_minus(true)
        .comment("/*", "*/", CommentFlags::empty())
        .quote(
            QuoteDef::new("\"", "\"")
                .name("STRING")
                .escapes(EscapeMap::verbatim()),
        )
        .quote(
            QuoteDef::new("'", "'")
                .name("SQ_STRING")
                .escapes(EscapeMap::verbatim()),
        )
        .token("URL", "url", CSS_URL)
        .token("PATH", "", CSS_PATH)
        .token("DCOLON", "::", CSS_DCOLON)
        .token("INCLUDES", "~=", CSS_INCLUDES)
        .token("DASHMATCH", "|=", CSS_DASHMATCH)
        .token("PREFIXMATCH", "^=", CSS_PREFIXMATCH)
        .token("SUFFIXMATCH", "$=", CSS_SUFFIXMATCH)
        .token("SUBSTRMATCH", "*=", CSS_SUBSTRMATCH)
        .token("AT", "@", TokenId::from_char(u32::from('@')))
        .token("HASH", "#", TokenId::from_char(u32::from('#')));
    for unit in CSS_UNITS {
        builder = builder.number_suffix(unit);
    }
    builder
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Url {
    Idle,
    /// `url` was returned; a `(` is expected.
    Open,
    /// `(` was returned; the body comes next.
    Body,
}

/// Lexer for CSS3 returning `url(...)` bodies as [`CSS_PATH`] tokens.
#[derive(Debug)]
pub struct Css3Lexer {
    lexer: Lexer,
    url: Url,
}

impl Css3Lexer {
    /// Wrap a lexer built from [`css3`].
    pub fn new(spec: Arc<LexSpec>) -> Self {
        Self {
            lexer: Lexer::new(spec),
            url: Url::Idle,
        }
    }

    pub fn push(&mut self, source: Source) {
        self.lexer.push(source);
    }

    #[inline]
    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    #[inline]
    pub fn lexer_mut(&mut self) -> &mut Lexer {
        &mut self.lexer
    }

    pub fn into_inner(self) -> Lexer {
        self.lexer
    }

    pub fn next(&mut self) -> TokenId {
        if self.url == Url::Body {
            self.url = Url::Idle;
            return self.url_body();
        }
        let id = self.lexer.next();
        self.url = match self.url {
            Url::Idle if id == CSS_URL => Url::Open,
            Url::Open if id == TokenId::from_char(u32::from('(')) => Url::Body,
            _ => Url::Idle,
        };
        id
    }

    /// Read the body after `url(` up to the matching `)`, which is left in
    /// the input.
    fn url_body(&mut self) -> TokenId {
        self.lexer.skip_blanks();
        match self.lexer.peek_char() {
            Peeked::Quote(_) => {
                self.lexer.next();
                let text = self.lexer.lexeme_text().into_owned();
                self.lexer.set_token(CSS_PATH, &text);
                return CSS_PATH;
            }
            Peeked::Char(')') => return self.lexer.next(),
            Peeked::Char(_) => {}
            Peeked::Token(_) | Peeked::Eof | Peeked::Eoi => return self.lexer.next(),
        }

        let mut body = String::new();
        let mut level = 0usize;
        loop {
            let ch = match self.lexer.peek_char() {
                Peeked::Char(')') if level == 0 => break,
                Peeked::Char(ch) => ch,
                _ => break,
            };
            self.lexer.get_char();
            match ch {
                '(' => level += 1,
                ')' => level -= 1,
                _ => {}
            }
            body.push(ch);
        }
        let path = body.trim_end();
        tracing::trace!(path, "url body");
        self.lexer.set_token(CSS_PATH, path);
        CSS_PATH
    }
}

impl TokenSource for Css3Lexer {
    fn next_token(&mut self) -> TokenId {
        self.next()
    }

    fn lexer(&self) -> &Lexer {
        &self.lexer
    }
}
