//! Input contexts.
//!
//! Each pushed source gets a [`Context`] holding its input, the current
//! fill, line tracking and an unget deque. Contexts form a stack owned by
//! the lexer; the bottom context has no input and is never popped.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::LexErrorKind;
use crate::fill::{self, Fill, FillAt, FILL_CHUNK};
use crate::input::RawInput;
use crate::record::RecordedToken;
use crate::source::{Feed, Source};
use crate::spec::LexSpec;
use crate::token::Token;
use uls_lexer_core::ViewId;

#[derive(Debug)]
pub(crate) enum Input {
    /// The bottom context.
    Empty,
    Raw(RawInput),
    Tokens(VecDeque<RecordedToken>),
}

/// Input returned to the front of a context.
#[derive(Debug)]
pub(crate) enum Pending {
    /// An ungot token with the line advance it had when first returned.
    Token { token: Token, delta: usize },
    /// Ungot text, cooked into a fill of its own.
    Text(Fill),
}

/// What the next read of a context will see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Ahead {
    Text,
    Literal(ViewId),
    /// An ungot token.
    Token,
    /// No more text or ungot input; recorded tokens may still follow.
    End,
}

#[derive(Debug)]
pub(crate) struct Context {
    pub input: Input,
    pub fill: Fill,
    pub pending: VecDeque<Pending>,
    pub tag: Arc<str>,
    /// Line of the current position.
    pub line: usize,
    /// Lines to add before the next read, left by a token spanning lines.
    pub delta: usize,
    pub bol: bool,
    pub want_eof: bool,
    pub eof_sent: bool,
    /// A fatal error occurred; reads fail fast.
    pub failed: bool,
    /// Fill error to report once the text before it has been read.
    pub fill_error: Option<LexErrorKind>,
}

impl Context {
    pub fn bottom() -> Self {
        Self::with_input(Input::Empty, Arc::from(""), false)
    }

    pub fn from_source(source: Source) -> Self {
        let input = match source.feed {
            Feed::Bytes(reader) => Input::Raw(RawInput::new(reader)),
            Feed::Tokens(records) => Input::Tokens(records),
        };
        Self::with_input(input, source.tag, source.want_eof)
    }

    fn with_input(input: Input, tag: Arc<str>, want_eof: bool) -> Self {
        Self {
            input,
            fill: Fill::default(),
            pending: VecDeque::new(),
            tag,
            line: 1,
            delta: 0,
            bol: true,
            want_eof,
            eof_sent: false,
            failed: false,
            fill_error: None,
        }
    }

    /// The fill read next with the line counters.
    pub fn active(&mut self) -> (&mut Fill, &mut usize, &mut usize) {
        let fill = match self.pending.front_mut() {
            Some(Pending::Text(text)) => text,
            _ => &mut self.fill,
        };
        (fill, &mut self.line, &mut self.delta)
    }

    /// Apply the pending line advance.
    #[inline]
    pub fn settle_line(&mut self) {
        self.line += std::mem::take(&mut self.delta);
    }

    /// Drop finished ungot text and refill the raw input as needed.
    pub fn prepare(&mut self, spec: &LexSpec) -> Result<Ahead, LexErrorKind> {
        loop {
            match self.pending.front() {
                Some(Pending::Token { .. }) => return Ok(Ahead::Token),
                Some(Pending::Text(text)) => match text.at() {
                    FillAt::Text => return Ok(Ahead::Text),
                    FillAt::Literal(view) => return Ok(Ahead::Literal(view)),
                    FillAt::End => {
                        self.pending.pop_front();
                        continue;
                    }
                },
                None => {}
            }
            match self.fill.at() {
                FillAt::Text => return Ok(Ahead::Text),
                FillAt::Literal(view) => return Ok(Ahead::Literal(view)),
                FillAt::End => {}
            }
            if let Some(kind) = self.fill_error.take() {
                return Err(kind);
            }
            if !self.refill(spec) {
                return Ok(Ahead::End);
            }
        }
    }

    /// Cook the next chunk of raw input. Returns `false` when nothing is left.
    fn refill(&mut self, spec: &LexSpec) -> bool {
        let Input::Raw(raw) = &mut self.input else {
            return false;
        };
        if raw.at_end() {
            return false;
        }
        if let Err(kind) = fill::refill(spec, raw, &mut self.fill, &mut self.bol, Some(FILL_CHUNK))
        {
            self.fill_error = Some(kind);
        }
        tracing::debug!(tag = %self.tag, line = self.line, "refilled");
        true
    }
}
