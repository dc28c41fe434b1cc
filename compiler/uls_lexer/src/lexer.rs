//! The lexer: context stack, dispatch loop and token accessors.
//!
//! # Design
//!
//! [`Lexer::next`] never fails. Errors become ERR tokens whose lexeme is the
//! error message; the error itself stays available through
//! [`Lexer::last_error`]. Fatal errors mark the current context as failed so
//! later calls return ERR without touching its input until it is popped.
//!
//! When a source ends the lexer optionally returns one EOF token for it,
//! pops it and continues with the source below. Once the bottom of the
//! stack is reached every call returns EOI until something is pushed.

mod chars;
mod scan;
mod unget;

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use uls_lexer_core::{KeywordExport, Reserved, TokenId};

use crate::context::{Ahead, Context, Input, Pending};
use crate::error::{LexError, LexErrorKind};
use crate::log::{LogLevel, LogRecord, LogSink, TracingSink};
use crate::number;
use crate::record;
use crate::source::Source;
use crate::spec::LexSpec;
use crate::token::{Token, TokenKind};

pub use chars::Peeked;

/// Tokenizer over a stack of sources.
pub struct Lexer {
    spec: Arc<LexSpec>,
    stack: Vec<Context>,
    token: Token,
    ungot: bool,
    eoi: bool,
    last_error: Option<LexError>,
    sink: Arc<dyn LogSink>,
    extras: FxHashMap<TokenId, Box<dyn Any + Send>>,
    stats: Option<KeywordExport>,
}

impl fmt::Debug for Lexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("spec", &self.spec.name())
            .field("depth", &self.stack.len())
            .field("token", &self.token)
            .field("eoi", &self.eoi)
            .finish_non_exhaustive()
    }
}

/// Result of one pass of the dispatch loop.
enum Step {
    Token(Token),
    Error(LexErrorKind),
    Failed,
    EndOfSource,
}

impl Lexer {
    /// Lexer logging through `tracing`.
    pub fn new(spec: Arc<LexSpec>) -> Self {
        Self::with_sink(spec, Arc::new(TracingSink))
    }

    pub fn with_sink(spec: Arc<LexSpec>, sink: Arc<dyn LogSink>) -> Self {
        let token = Token::reserved(&spec, Reserved::None, b"", 0);
        Self {
            spec,
            stack: vec![Context::bottom()],
            token,
            ungot: false,
            eoi: false,
            last_error: None,
            sink,
            extras: FxHashMap::default(),
            stats: None,
        }
    }

    #[inline]
    pub fn spec(&self) -> &Arc<LexSpec> {
        &self.spec
    }

    #[inline]
    fn top(&self) -> &Context {
        &self.stack[self.stack.len() - 1]
    }

    #[inline]
    fn top_mut(&mut self) -> &mut Context {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub(crate) fn log(&self, level: LogLevel, message: fmt::Arguments<'_>) {
        let ctx = self.top();
        self.sink.log(&LogRecord {
            level,
            tag: &ctx.tag,
            line: ctx.line,
            message,
        });
    }

    /// Error located at the current position.
    pub(crate) fn error(&self, kind: impl Into<LexErrorKind>) -> LexError {
        let ctx = self.top();
        LexError::new(Arc::clone(&ctx.tag), ctx.line, kind)
    }

    // === Scanning ===

    /// Advance to the next token and return its id.
    pub fn next(&mut self) -> TokenId {
        self.ungot = false;
        let token = self.advance();
        if let (Some(stats), TokenKind::Word) = (&mut self.stats, token.kind) {
            stats.bump(&token.lexeme);
        }
        tracing::trace!(id = token.id.0, line = token.line, "token");
        self.token = token;
        self.token.id
    }

    fn advance(&mut self) -> Token {
        loop {
            if self.eoi {
                return Token::reserved(&self.spec, Reserved::Eoi, b"", self.top().line);
            }
            let step = self.step();
            match step {
                Step::Token(token) => return token,
                Step::Error(kind) => return self.raise(kind),
                Step::Failed => {
                    let message = self
                        .last_error
                        .as_ref()
                        .map_or_else(String::new, ToString::to_string);
                    return Token::reserved(
                        &self.spec,
                        Reserved::Err,
                        message.as_bytes(),
                        self.top().line,
                    );
                }
                Step::EndOfSource => {
                    let ctx = self.top_mut();
                    ctx.settle_line();
                    if ctx.want_eof && !ctx.eof_sent {
                        ctx.eof_sent = true;
                        let lexeme = format!("{} {} {}", ctx.line, ctx.tag.len(), ctx.tag);
                        let line = ctx.line;
                        return Token::reserved(&self.spec, Reserved::Eof, lexeme.as_bytes(), line);
                    }
                    if self.stack.len() > 1 {
                        if let Some(ctx) = self.stack.pop() {
                            tracing::debug!(tag = %ctx.tag, line = ctx.line, "source finished");
                        }
                        continue;
                    }
                    self.eoi = true;
                }
            }
        }
    }

    fn step(&mut self) -> Step {
        let spec = &*self.spec;
        let last = self.stack.len() - 1;
        let ctx = &mut self.stack[last];
        if ctx.failed {
            return Step::Failed;
        }
        loop {
            match ctx.prepare(spec) {
                Err(kind) => return Step::Error(kind),
                Ok(Ahead::Token) => {
                    if let Some(Pending::Token { token, delta }) = ctx.pending.pop_front() {
                        ctx.line = token.line;
                        ctx.delta = delta;
                        return Step::Token(token);
                    }
                }
                Ok(Ahead::Text | Ahead::Literal(_)) => {
                    let (fill, line, delta) = ctx.active();
                    match scan::scan(spec, fill, line, delta) {
                        scan::Scan::Token(token) => return Step::Token(token),
                        scan::Scan::Error(kind) => return Step::Error(kind),
                        scan::Scan::Exhausted => {}
                    }
                }
                Ok(Ahead::End) => {
                    let Input::Tokens(records) = &mut ctx.input else {
                        return Step::EndOfSource;
                    };
                    let Some(rec) = records.pop_front() else {
                        return Step::EndOfSource;
                    };
                    ctx.settle_line();
                    if let Ok(line) = usize::try_from(rec.line) {
                        if line > 0 {
                            ctx.line = line;
                        }
                    }
                    if TokenId(rec.id) == spec.id(Reserved::LineNum) {
                        continue;
                    }
                    return Step::Token(record::to_token(spec, &rec, ctx.line));
                }
            }
        }
    }

    /// Turn an error into an ERR token, recording and logging it.
    fn raise(&mut self, kind: LexErrorKind) -> Token {
        let err = self.error(kind);
        let fatal = err.is_fatal();
        let level = if fatal {
            LogLevel::Error
        } else {
            LogLevel::Warn
        };
        self.log(level, format_args!("{}", err.kind));
        if fatal {
            self.top_mut().failed = true;
        }
        let token = Token::reserved(
            &self.spec,
            Reserved::Err,
            err.to_string().as_bytes(),
            err.line,
        );
        self.last_error = Some(err);
        token
    }

    /// Fail unless the current token has id `id`.
    pub fn expect(&self, id: TokenId) -> Result<(), LexError> {
        if self.token.id == id {
            Ok(())
        } else {
            Err(self.error(LexErrorKind::Unexpected {
                expected: id,
                found: self.token.id,
            }))
        }
    }

    /// Replace the current token.
    pub fn set_token(&mut self, id: TokenId, lexeme: &str) {
        let view = self.spec.arena().find_by_id(id);
        self.token = Token::new(id, view, lexeme.as_bytes(), self.line(), TokenKind::Plain);
    }

    // === Current token ===

    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    #[inline]
    pub fn token_id(&self) -> TokenId {
        self.token.id
    }

    #[inline]
    pub fn lexeme(&self) -> &[u8] {
        &self.token.lexeme
    }

    pub fn lexeme_text(&self) -> Cow<'_, str> {
        self.token.text()
    }

    pub fn is_int(&self) -> bool {
        self.token.number().is_some_and(number::NumberInfo::is_int)
    }

    pub fn is_real(&self) -> bool {
        self.token.number().is_some_and(number::NumberInfo::is_real)
    }

    pub fn is_zero(&self) -> bool {
        self.token.number().is_some_and(number::NumberInfo::is_zero)
    }

    pub fn number_radix(&self) -> Option<u32> {
        self.token.number().map(number::NumberInfo::radix)
    }

    /// Suffix that followed the current number.
    pub fn number_suffix(&self) -> Option<&str> {
        let index = self.token.number()?.suffix_index()?;
        self.spec.numbers().suffixes.get(index).map(|s| &**s)
    }

    pub fn lexeme_u64(&self) -> Option<u64> {
        number::to_u64(&self.token.lexeme, self.token.number()?)
    }

    pub fn lexeme_i64(&self) -> Option<i64> {
        number::to_i64(&self.token.lexeme, self.token.number()?)
    }

    pub fn lexeme_f64(&self) -> Option<f64> {
        number::to_f64(&self.token.lexeme, self.token.number()?)
    }

    /// Line and tag carried by the current EOF token.
    pub fn eof_tag(&self) -> Option<(usize, &str)> {
        if self.token.id != self.spec.id(Reserved::Eof) {
            return None;
        }
        let text = std::str::from_utf8(&self.token.lexeme).ok()?;
        let (line, rest) = text.split_once(' ')?;
        let (len, tag) = rest.split_once(' ')?;
        let len: usize = len.parse().ok()?;
        Some((line.parse().ok()?, tag.get(..len)?))
    }

    /// Error behind the most recent ERR token.
    #[inline]
    pub fn last_error(&self) -> Option<&LexError> {
        self.last_error.as_ref()
    }

    // === Specification lookups ===

    pub fn token_name(&self, id: TokenId) -> Option<&str> {
        self.spec.token_name(id)
    }

    pub fn keyword_text(&self, id: TokenId) -> Option<String> {
        self.spec.keyword_text(id)
    }

    pub fn is_quote_token(&self, id: TokenId) -> bool {
        self.spec.quote_by_id(id).is_some()
    }

    // === Location ===

    /// Line of the current position in the active source.
    #[inline]
    pub fn line(&self) -> usize {
        self.top().line
    }

    pub fn inc_line(&mut self, n: usize) {
        self.top_mut().line += n;
    }

    pub fn tag(&self) -> &str {
        &self.top().tag
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.top_mut().tag = tag.into();
    }

    // === Context stack ===

    /// Read `source` before continuing with the current one.
    #[tracing::instrument(level = "debug", skip_all, fields(tag = source.tag()))]
    pub fn push(&mut self, source: Source) {
        self.stack.push(Context::from_source(source));
        self.eoi = false;
    }

    pub fn push_str(&mut self, tag: &str, text: &str) {
        self.push(Source::text(tag, text));
    }

    pub fn push_file(&mut self, path: impl AsRef<Path>) -> Result<(), LexError> {
        let path = path.as_ref();
        let source = Source::file(path).map_err(|err| {
            LexError::new(path.display().to_string().into(), 0, LexErrorKind::Io(err))
        })?;
        self.push(source);
        Ok(())
    }

    /// Drop every pushed source, then read `source`.
    pub fn set_source(&mut self, source: Source) {
        self.pop_all();
        self.push(source);
    }

    /// Drop the current source. Returns `false` at the bottom of the stack.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn pop_all(&mut self) {
        self.stack.truncate(1);
    }

    /// Number of pushed sources.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    // === Per-lexer data ===

    /// Start counting keyword occurrences.
    pub fn enable_keyword_stats(&mut self) {
        self.stats = Some(self.spec.keywords().export());
    }

    pub fn keyword_stats(&self) -> Option<&KeywordExport> {
        self.stats.as_ref()
    }

    /// Attach user data to a token id.
    pub fn set_extra<T: Any + Send>(&mut self, id: TokenId, value: T) {
        self.extras.insert(id, Box::new(value));
    }

    pub fn extra<T: Any>(&self, id: TokenId) -> Option<&T> {
        self.extras.get(&id)?.downcast_ref()
    }
}
