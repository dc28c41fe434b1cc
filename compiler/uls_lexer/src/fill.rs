//! Cooked fills and the raw filler.
//!
//! # Design
//!
//! The filler reads raw bytes and produces a [`Fill`]: cooked text in which
//! comments are already removed, plus a list of [`LexSeg`]s. Each segment
//! ends a run of cooked text and may carry one literal string that was
//! decoded while scanning ahead:
//!
//! ```text
//! raw:     a = "x\ty" /* c */ + b\n
//! cooked:  a = | + b\n            (| marks the end of run 0)
//! segs:    [run 0 .. "x<TAB>y"] [run 1 .. end]
//! ```
//!
//! When the dispatch engine reaches the end of a run it emits the run's
//! literal as a quote token, so literal decoding never happens during token
//! dispatch. A fill stops at a line boundary once it holds [`FILL_CHUNK`]
//! cooked bytes, or when [`MAX_SEGS`] segments are recorded.
//!
//! Comment bodies are replaced by their newlines (or one space when they
//! have none) so line counting and token separation are preserved.

use std::ops::Range;

use uls_lexer_core::{CharClass, Cursor, DecodeState, QuoteFlags, QuoteType, ViewId};

use crate::error::LexErrorKind;
use crate::input::RawInput;
use crate::spec::{CommentFlags, CommentType, LexSpec};

/// Cooked bytes after which a fill stops at the next line boundary.
pub const FILL_CHUNK: usize = 1024;
/// Most segments per fill.
pub const MAX_SEGS: usize = 63;

/// A literal decoded during a fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Literal {
    pub view: ViewId,
    /// Range in [`Fill::literals`].
    pub text: Range<usize>,
    /// Newlines in the raw literal, marks included.
    pub newlines: usize,
}

/// End of one cooked run, optionally followed by a literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LexSeg {
    pub end: usize,
    pub literal: Option<Literal>,
}

/// One filled window of cooked input.
#[derive(Clone, Debug, Default)]
pub(crate) struct Fill {
    pub cooked: Vec<u8>,
    pub literals: Vec<u8>,
    pub segs: Vec<LexSeg>,
    /// Current segment.
    pub seg: usize,
    /// Cursor position in `cooked`.
    pub pos: usize,
}

impl Fill {
    fn reset(&mut self) {
        self.cooked.clear();
        self.literals.clear();
        self.segs.clear();
        self.seg = 0;
        self.pos = 0;
    }

    /// What the cursor faces.
    pub fn at(&self) -> FillAt {
        if self.pos < self.run_end() {
            return FillAt::Text;
        }
        match self.segs.get(self.seg).and_then(|seg| seg.literal.as_ref()) {
            Some(literal) => FillAt::Literal(literal.view),
            None => FillAt::End,
        }
    }

    /// Insert cooked text at the cursor. Fails once every run is consumed.
    pub fn splice(&mut self, text: &[u8]) -> bool {
        if self.is_exhausted() {
            return false;
        }
        let at = self.pos;
        self.cooked.splice(at..at, text.iter().copied());
        for seg in &mut self.segs[self.seg..] {
            seg.end += text.len();
        }
        true
    }

    /// Every segment has been consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.seg >= self.segs.len()
    }

    /// End of the current run.
    #[inline]
    pub fn run_end(&self) -> usize {
        self.segs.get(self.seg).map_or(self.pos, |seg| seg.end)
    }

    /// Cursor over the current run at the current position.
    #[inline]
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::at(&self.cooked[..self.run_end()], self.pos)
    }

    /// Leave the current run. Returns its literal, if any.
    pub fn next_seg(&mut self) -> Option<Literal> {
        let seg = self.segs.get(self.seg)?;
        let literal = seg.literal.clone();
        self.pos = seg.end;
        self.seg += 1;
        literal
    }

    #[inline]
    pub fn literal_text(&self, literal: &Literal) -> &[u8] {
        &self.literals[literal.text.clone()]
    }

    /// Cooked bytes not yet consumed, up to the end of the current run.
    #[inline]
    pub fn rest_of_run(&self) -> &[u8] {
        &self.cooked[self.pos..self.run_end()]
    }
}

/// Position of a fill cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FillAt {
    /// Unread cooked text.
    Text,
    /// A literal ends the current run.
    Literal(ViewId),
    /// Nothing left.
    End,
}

/// Refill `fill` from `raw`.
///
/// `bol` tracks whether the raw position is at the beginning of a line.
/// With `limit` set the fill stops at the first line boundary past that
/// many cooked bytes; without it the whole input is cooked. On error the
/// text cooked before the failing comment or literal is kept.
#[tracing::instrument(level = "trace", skip_all)]
pub(crate) fn refill(
    spec: &LexSpec,
    raw: &mut RawInput,
    fill: &mut Fill,
    bol: &mut bool,
    limit: Option<usize>,
) -> Result<(), LexErrorKind> {
    fill.reset();
    let result = Filler {
        spec,
        raw,
        fill,
        bol,
    }
    .run(limit);
    fill.segs.push(LexSeg {
        end: fill.cooked.len(),
        literal: None,
    });
    tracing::trace!(
        cooked = fill.cooked.len(),
        segs = fill.segs.len(),
        failed = result.is_err(),
        "filled"
    );
    result
}

struct Filler<'a> {
    spec: &'a LexSpec,
    raw: &'a mut RawInput,
    fill: &'a mut Fill,
    bol: &'a mut bool,
}

impl Filler<'_> {
    fn run(&mut self, limit: Option<usize>) -> Result<(), LexErrorKind> {
        let lookahead = self.spec.lookahead();
        loop {
            if limit.is_some_and(|limit| self.fill.cooked.len() >= limit) && *self.bol {
                break;
            }
            if self.fill.segs.len() + 1 >= MAX_SEGS {
                break;
            }
            self.raw.ensure(lookahead)?;
            let Some(&first) = self.raw.available().first() else {
                break;
            };

            let class = self.spec.chars().class_of_byte(first);
            if class.contains(CharClass::COMMENT) {
                if let Some(comment) = self.match_comment() {
                    self.skip_comment(comment)?;
                    continue;
                }
            }
            if class.contains(CharClass::QUOTE) {
                if let Some(quote) = self.match_quote() {
                    self.read_quote(quote)?;
                    continue;
                }
            }
            self.copy_run();
        }
        Ok(())
    }

    fn match_comment(&self) -> Option<usize> {
        let avail = self.raw.available();
        self.spec.comments().iter().position(|c: &CommentType| {
            avail.starts_with(c.start())
                && (*self.bol || !c.flags().contains(CommentFlags::COLUMN0))
        })
    }

    fn match_quote(&self) -> Option<usize> {
        let avail = self.raw.available();
        self.spec
            .quotes()
            .iter()
            .position(|q| avail.starts_with(q.start()))
    }

    /// Copy plain bytes up to and including the next newline, stopping
    /// before any byte that may start a comment or a literal.
    fn copy_run(&mut self) {
        let chars = self.spec.chars();
        let avail = self.raw.available();
        let mut len = 0;
        while len < avail.len() {
            let b = avail[len];
            if b == b'\n' {
                len += 1;
                break;
            }
            let special = chars
                .class_of_byte(b)
                .intersects(CharClass::COMMENT | CharClass::QUOTE);
            if special && len > 0 {
                break;
            }
            // A special byte that matched nothing is copied as one character.
            len += if b.is_ascii() {
                1
            } else {
                uls_lexer_core::utf8::width(b).unwrap_or(1).min(avail.len() - len)
            };
            if special {
                break;
            }
        }
        self.fill.cooked.extend_from_slice(&avail[..len]);
        *self.bol = avail[len - 1] == b'\n';
        self.raw.consume(len);
    }

    fn push_newlines(&mut self, n: usize, separate: bool) {
        if n == 0 {
            if separate {
                self.fill.cooked.push(b' ');
            }
            *self.bol = false;
            return;
        }
        self.fill.cooked.extend(std::iter::repeat(b'\n').take(n));
        *self.bol = true;
    }

    fn skip_comment(&mut self, index: usize) -> Result<(), LexErrorKind> {
        let spec = self.spec;
        let comment = &spec.comments()[index];
        let (start, end) = (comment.start(), comment.end());
        let nested = comment.flags().contains(CommentFlags::NESTED);
        let one_line = comment.flags().contains(CommentFlags::ONE_LINE);
        let keep = start.len().max(end.len()) - 1;

        self.raw.consume(start.len());
        let mut newlines = count_newlines(start);
        let mut depth = 1usize;
        while depth > 0 {
            self.raw.ensure(spec.lookahead())?;
            let avail = self.raw.available();
            let mut cur = Cursor::new(avail);
            let found_end = cur.eat_until_mark(end).then_some(cur.pos());
            let found_start = nested
                .then(|| {
                    let mut c = Cursor::new(avail);
                    c.eat_until_mark(start).then_some(c.pos())
                })
                .flatten();

            // A nested start mark before the end mark opens another level.
            let opens = found_start.filter(|&s| found_end.map_or(true, |e| s < e));
            if let Some(s) = opens {
                newlines += count_newlines(&avail[..s + start.len()]);
                self.raw.consume(s + start.len());
                depth += 1;
            } else if let Some(e) = found_end {
                newlines += count_newlines(&avail[..e + end.len()]);
                self.raw.consume(e + end.len());
                depth -= 1;
            } else if self.raw.is_eof() {
                if one_line && depth == 1 {
                    newlines += count_newlines(avail);
                    let n = avail.len();
                    self.raw.consume(n);
                    break;
                }
                return Err(LexErrorKind::UnterminatedComment);
            } else {
                let safe = avail.len().saturating_sub(keep);
                newlines += count_newlines(&avail[..safe]);
                self.raw.consume(safe);
                self.raw.read_more()?;
            }
        }
        self.push_newlines(newlines, true);
        Ok(())
    }

    fn read_quote(&mut self, index: usize) -> Result<(), LexErrorKind> {
        let spec = self.spec;
        let quote: &QuoteType = &spec.quotes()[index];
        self.raw.consume(quote.start().len());
        let mut newlines = quote.start_lfs();

        if quote.flags().contains(QuoteFlags::NOTHING) {
            self.push_newlines(newlines, false);
            return Ok(());
        }

        let text_start = self.fill.literals.len();
        if quote.has_body() {
            let mut state = DecodeState::Plain;
            loop {
                let at_end = self.raw.is_eof();
                let step = quote.step(
                    state,
                    self.raw.available(),
                    at_end,
                    &mut self.fill.literals,
                );
                let (next, adv) = step?;
                self.raw.consume(adv.consumed);
                newlines += adv.newlines;
                if next == DecodeState::Done {
                    break;
                }
                let stalled = next == state && adv.consumed == 0;
                state = next;
                if stalled || self.raw.available().len() < adv.need.max(1) {
                    if self.raw.is_eof() {
                        if stalled {
                            return Err(LexErrorKind::UnterminatedLiteral);
                        }
                    } else {
                        self.raw.read_more()?;
                    }
                }
            }
            if !quote.flags().contains(QuoteFlags::R_EXCLUSIVE) {
                self.raw.consume(quote.end().len());
                newlines += quote.end_lfs();
            }
        }

        self.fill.segs.push(LexSeg {
            end: self.fill.cooked.len(),
            literal: Some(Literal {
                view: quote.view(),
                text: text_start..self.fill.literals.len(),
                newlines,
            }),
        });
        *self.bol = false;
        Ok(())
    }
}

#[inline]
fn count_newlines(bytes: &[u8]) -> usize {
    memchr::memchr_iter(b'\n', bytes).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
