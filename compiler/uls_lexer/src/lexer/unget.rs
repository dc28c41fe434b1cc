//! Returning input to the front of the current context.

use uls_lexer_core::{Reserved, TokenId};

use super::Lexer;
use crate::context::{Input, Pending};
use crate::error::{LexError, LexErrorKind};
use crate::fill::{self, Fill};
use crate::input::RawInput;
use crate::log::LogLevel;
use crate::record::{self, RecordedToken};
use crate::token::Token;

impl Lexer {
    /// Push the current token back so the next call returns it again.
    ///
    /// Fails when there is no current token or it was already ungot.
    pub fn unget_token(&mut self) -> Result<(), LexError> {
        let kind = if self.ungot {
            Some(LexErrorKind::AlreadyUngot)
        } else if self.token.id == self.spec.id(Reserved::None) {
            Some(LexErrorKind::NothingToUnget)
        } else {
            None
        };
        if let Some(kind) = kind {
            self.log(LogLevel::Warn, format_args!("unget: {kind}"));
            return Err(self.error(kind));
        }

        let none = Token::reserved(&self.spec, Reserved::None, b"", self.token.line);
        let token = std::mem::replace(&mut self.token, none);
        let ctx = self.top_mut();
        let delta = std::mem::take(&mut ctx.delta);
        ctx.line = token.line;
        ctx.pending.push_front(Pending::Token { token, delta });
        self.ungot = true;
        self.eoi = false;
        Ok(())
    }

    /// Put `text` back in front of the input.
    ///
    /// The text joins whatever follows it in the buffered input, so ungetting
    /// `"ab"` before `"cd"` reads as the single identifier `abcd`. Comments and literals in
    /// `text` are processed as usual.
    pub fn unget_str(&mut self, text: &str) -> Result<(), LexError> {
        let mut cooked = Fill::default();
        let mut bol = false;
        let mut raw = RawInput::from_bytes(text.as_bytes().to_vec());
        if let Err(kind) = fill::refill(&self.spec, &mut raw, &mut cooked, &mut bol, None) {
            self.log(LogLevel::Warn, format_args!("unget: {kind}"));
            return Err(self.error(kind));
        }

        let line = self.line();
        self.token = Token::reserved(&self.spec, Reserved::None, b"", line);
        let ctx = self.top_mut();
        ctx.settle_line();
        let newlines = memchr::memchr_iter(b'\n', text.as_bytes()).count();
        ctx.line = ctx.line.saturating_sub(newlines);

        let plain = cooked.segs.len() == 1;
        let spliced = plain
            && match ctx.pending.front_mut() {
                Some(Pending::Text(front)) => front.splice(&cooked.cooked),
                Some(Pending::Token { .. }) => false,
                None => !matches!(ctx.input, Input::Tokens(_)) && ctx.fill.splice(&cooked.cooked),
            };
        if !spliced {
            ctx.pending.push_front(Pending::Text(cooked));
        }
        self.eoi = false;
        Ok(())
    }

    pub fn unget_char(&mut self, ch: char) -> Result<(), LexError> {
        self.unget_str(ch.encode_utf8(&mut [0; 4]))
    }

    /// Push back a token given by lexeme and id.
    ///
    /// With the NONE id the lexeme is ungot as text instead.
    pub fn unget_lexeme(&mut self, lexeme: &str, id: TokenId) -> Result<(), LexError> {
        if id == self.spec.id(Reserved::None) {
            return self.unget_str(lexeme);
        }
        let rec = RecordedToken {
            id: id.0,
            lexeme: lexeme.as_bytes().to_vec(),
            line: 0,
        };
        let token = record::to_token(&self.spec, &rec, self.line());
        self.top_mut()
            .pending
            .push_front(Pending::Token { token, delta: 0 });
        self.eoi = false;
        Ok(())
    }
}
