//! Tokens returned by the lexer.

use std::borrow::Cow;

use uls_lexer_core::{Reserved, TokenId, ViewId};

use crate::number::{Lexeme, NumberInfo};
use crate::spec::LexSpec;

/// How a token was scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Operator, reserved or synthesized token.
    Plain,
    /// Identifier or keyword.
    Word,
    /// Literal string; the lexeme is the decoded text.
    Quote,
    Number(NumberInfo),
}

/// One scanned token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub(crate) id: TokenId,
    pub(crate) view: Option<ViewId>,
    pub(crate) lexeme: Lexeme,
    pub(crate) line: usize,
    pub(crate) kind: TokenKind,
}

impl Token {
    pub(crate) fn new(
        id: TokenId,
        view: Option<ViewId>,
        lexeme: &[u8],
        line: usize,
        kind: TokenKind,
    ) -> Self {
        Self {
            id,
            view,
            lexeme: Lexeme::from_slice(lexeme),
            line,
            kind,
        }
    }

    /// Token of a view, by view.
    pub(crate) fn of_view(
        spec: &LexSpec,
        view: ViewId,
        lexeme: &[u8],
        line: usize,
        kind: TokenKind,
    ) -> Self {
        Self::new(spec.arena().id_of(view), Some(view), lexeme, line, kind)
    }

    /// Reserved token.
    pub(crate) fn reserved(spec: &LexSpec, which: Reserved, lexeme: &[u8], line: usize) -> Self {
        Self::of_view(
            spec,
            spec.reserved().view(which),
            lexeme,
            line,
            TokenKind::Plain,
        )
    }

    #[inline]
    pub fn id(&self) -> TokenId {
        self.id
    }

    /// View of the token id; `None` for anonymous one-char tokens.
    #[inline]
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    #[inline]
    pub fn lexeme(&self) -> &[u8] {
        &self.lexeme
    }

    /// Lexeme as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.lexeme)
    }

    /// Line the token was read on.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub fn number(&self) -> Option<&NumberInfo> {
        match &self.kind {
            TokenKind::Number(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn is_quote(&self) -> bool {
        self.kind == TokenKind::Quote
    }
}
