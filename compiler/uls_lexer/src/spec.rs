//! Lexical specification and its builder.
//!
//! A [`LexSpec`] is immutable once built and shared through `Arc` by any
//! number of lexers. [`LexSpecBuilder`] collects token definitions, quote
//! and comment types, number syntax and character classes, then validates
//! everything in [`LexSpecBuilder::build`]. Builder methods never fail
//! themselves; the first problem is reported by `build`.
//!
//! # Token classification
//!
//! A token spelling lands in exactly one lookup table:
//!
//! - identifier-shaped text (`if`, `url`) goes to the keyword table,
//! - a single character (`;`, `→`) goes to the one-char table,
//! - anything longer (`<<=`, `::`) goes to the multi-char table.
//!
//! Characters are flagged automatically: multi-char spellings set
//! [`CharClass::TWO_PLUS`] on their bytes, one-char spellings set
//! [`CharClass::ONE_CHAR`], quote and comment start marks set
//! [`CharClass::QUOTE`] and [`CharClass::COMMENT`] on their first byte.

use std::sync::Arc;

use uls_lexer_core::{
    utf8, ArenaError, CaseMode, CharClass, CharTable, EscapeMap, HashWeights, KeywordTable,
    LiteralAnalyzer, OneCharTable, QuoteFlags, QuoteType, Reserved, ReservedIds, TokenArena,
    TokenDef, TokenId, TwoPlusError, TwoPlusTable, ViewId, DEFAULT_SLOTS,
};

use bitflags::bitflags;

use crate::log::{LogLevel, LogRecord, LogSink, TracingSink};

/// Most comment types per specification.
pub const MAX_COMMENT_TYPES: usize = 4;
/// Longest comment mark in bytes.
pub const COMMENT_MARK_MAX: usize = 30;
/// Most quote types per specification.
pub const MAX_QUOTE_TYPES: usize = 8;
/// Longest quote mark in bytes.
pub const QUOTE_MARK_MAX: usize = 7;
/// Most radix prefixes.
pub const MAX_RADIX_PREFIXES: usize = 8;
/// Longest radix prefix in bytes.
pub const RADIX_PREFIX_MAX: usize = 7;
/// Raw bytes kept ahead of the filler at minimum.
pub const MIN_LOOKAHEAD: usize = 4;

bitflags! {
    /// Behaviour of a comment type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CommentFlags: u8 {
        /// The comment ends at the end of the line.
        const ONE_LINE = 0x01;
        /// The start mark counts only at the beginning of a line.
        const COLUMN0 = 0x02;
        /// Start marks inside the comment nest.
        const NESTED = 0x04;
    }
}

/// A comment delimiter pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentType {
    start: Box<[u8]>,
    end: Box<[u8]>,
    flags: CommentFlags,
}

impl CommentType {
    pub fn start(&self) -> &[u8] {
        &self.start
    }

    pub fn end(&self) -> &[u8] {
        &self.end
    }

    pub fn flags(&self) -> CommentFlags {
        self.flags
    }
}

/// A radix prefix such as `0x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadixPrefix {
    pub text: Box<[u8]>,
    pub radix: u32,
}

/// Configurable number grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberSyntax {
    /// Longest first.
    pub prefixes: Vec<RadixPrefix>,
    /// Longest first.
    pub suffixes: Vec<Box<str>>,
    /// Digit group separator, stripped from lexemes.
    pub separator: Option<u8>,
    /// `.5` is a number.
    pub leading_dot: bool,
}

impl Default for NumberSyntax {
    fn default() -> Self {
        Self {
            prefixes: Vec::new(),
            suffixes: Vec::new(),
            separator: None,
            leading_dot: true,
        }
    }
}

/// Errors found while building a specification.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("at most {MAX_QUOTE_TYPES} quote types are allowed")]
    TooManyQuotes,
    #[error("at most {MAX_COMMENT_TYPES} comment types are allowed")]
    TooManyComments,
    #[error("at most {MAX_RADIX_PREFIXES} radix prefixes are allowed")]
    TooManyPrefixes,
    #[error("bad quote mark `{mark}`: {reason}")]
    QuoteMark { mark: Box<str>, reason: &'static str },
    #[error("bad comment mark `{mark}`: {reason}")]
    CommentMark { mark: Box<str>, reason: &'static str },
    #[error("bad radix prefix `{prefix}` for radix {radix}")]
    RadixPrefix { prefix: Box<str>, radix: u32 },
    #[error("number suffix `{0}` must be a non-empty identifier-like text")]
    NumberSuffix(Box<str>),
    #[error("keyword `{0}` is defined twice")]
    DuplicateKeyword(Box<str>),
    #[error("unknown token name `{0}`")]
    UnknownName(Box<str>),
    #[error(transparent)]
    Arena(#[from] ArenaError),
    #[error(transparent)]
    TwoPlus(#[from] TwoPlusError),
}

/// A quote type as configured, before its token view is resolved.
#[derive(Clone, Debug)]
pub struct QuoteDef {
    start: String,
    end: String,
    name: Option<String>,
    id: Option<TokenId>,
    flags: QuoteFlags,
    escapes: Option<EscapeMap>,
    analyzer: Option<Arc<dyn LiteralAnalyzer>>,
}

impl QuoteDef {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_owned(),
            end: end.to_owned(),
            name: None,
            id: None,
            flags: QuoteFlags::empty(),
            escapes: None,
            analyzer: None,
        }
    }

    /// Token name; defaults to the start mark.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    /// Token id; defaults to the code of the first start-mark character.
    #[must_use]
    pub fn id(mut self, id: TokenId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: QuoteFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn escapes(mut self, escapes: EscapeMap) -> Self {
        self.escapes = Some(escapes);
        self
    }

    #[must_use]
    pub fn analyzer(mut self, analyzer: Arc<dyn LiteralAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }
}

/// Immutable lexical specification.
#[derive(Debug)]
pub struct LexSpec {
    name: Box<str>,
    chars: CharTable,
    arena: TokenArena,
    keywords: KeywordTable,
    onechars: OneCharTable,
    twoplus: TwoPlusTable,
    quotes: Vec<QuoteType>,
    comments: Vec<CommentType>,
    numbers: NumberSyntax,
    signed_numbers: bool,
    fold_minus: bool,
    id_max_bytes: Option<usize>,
    id_max_chars: Option<usize>,
    lookahead: usize,
}

impl LexSpec {
    pub fn builder(name: &str) -> LexSpecBuilder {
        LexSpecBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn chars(&self) -> &CharTable {
        &self.chars
    }

    #[inline]
    pub fn arena(&self) -> &TokenArena {
        &self.arena
    }

    #[inline]
    pub fn reserved(&self) -> &ReservedIds {
        self.arena.reserved()
    }

    /// Id of a reserved token in this specification.
    #[inline]
    pub fn id(&self, which: Reserved) -> TokenId {
        self.arena.reserved().id(which)
    }

    #[inline]
    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    #[inline]
    pub fn onechars(&self) -> &OneCharTable {
        &self.onechars
    }

    #[inline]
    pub fn twoplus(&self) -> &TwoPlusTable {
        &self.twoplus
    }

    /// Quote types, longest start mark first.
    #[inline]
    pub fn quotes(&self) -> &[QuoteType] {
        &self.quotes
    }

    /// Comment types, longest start mark first.
    #[inline]
    pub fn comments(&self) -> &[CommentType] {
        &self.comments
    }

    #[inline]
    pub fn numbers(&self) -> &NumberSyntax {
        &self.numbers
    }

    /// A `-` directly before a number is part of the number.
    #[inline]
    pub fn signed_numbers(&self) -> bool {
        self.signed_numbers
    }

    /// A `-` directly before an identifier is part of the identifier.
    #[inline]
    pub fn fold_minus(&self) -> bool {
        self.fold_minus
    }

    /// Identifier length limits in bytes and in characters.
    #[inline]
    pub fn id_limits(&self) -> (Option<usize>, Option<usize>) {
        (self.id_max_bytes, self.id_max_chars)
    }

    /// Raw bytes the filler keeps available ahead of its position.
    #[inline]
    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Token name of `id`, if the id has a view.
    pub fn token_name(&self, id: TokenId) -> Option<&str> {
        self.arena
            .find_by_id(id)
            .map(|view| &*self.arena.get(view).name)
    }

    /// First spelling registered for `id`, searching keywords, multi-char
    /// and one-char tokens in that order.
    pub fn keyword_text(&self, id: TokenId) -> Option<String> {
        let view = self.arena.find_by_id(id)?;
        if let Some(def) = self.keywords.iter().find(|d| d.view == view) {
            return Some(def.keyword.to_string());
        }
        if let Some(def) = self.twoplus.iter().find(|d| d.view == view) {
            return Some(def.keyword.to_string());
        }
        self.onechars
            .iter()
            .find(|&(_, v)| v == view)
            .and_then(|(ch, _)| char::from_u32(ch))
            .map(String::from)
    }

    /// Quote type whose tokens carry `id`.
    pub fn quote_by_id(&self, id: TokenId) -> Option<&QuoteType> {
        let view = self.arena.find_by_id(id)?;
        self.quotes.iter().find(|q| q.view() == view)
    }
}

/// Fluent builder for [`LexSpec`].
#[derive(Debug)]
pub struct LexSpecBuilder {
    name: Box<str>,
    chars: CharTable,
    arena: TokenArena,
    case: CaseMode,
    slots: usize,
    weights: HashWeights,
    tokens: Vec<(Box<str>, ViewId)>,
    quotes: Vec<QuoteDef>,
    comments: Vec<(String, String, CommentFlags)>,
    numbers: NumberSyntax,
    signed_numbers: bool,
    fold_minus: bool,
    id_max_bytes: Option<usize>,
    id_max_chars: Option<usize>,
    sink: Option<Arc<dyn LogSink>>,
    error: Option<SpecError>,
}

impl LexSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            chars: CharTable::new(),
            arena: TokenArena::new(),
            case: CaseMode::Sensitive,
            slots: DEFAULT_SLOTS,
            weights: HashWeights::default(),
            tokens: Vec::new(),
            quotes: Vec::new(),
            comments: Vec::new(),
            numbers: NumberSyntax::default(),
            signed_numbers: true,
            fold_minus: false,
            id_max_bytes: None,
            id_max_chars: None,
            sink: None,
            error: None,
        }
    }

    /// Where build diagnostics go; `tracing` by default.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn warn(&self, message: std::fmt::Arguments<'_>) {
        let record = LogRecord {
            level: LogLevel::Warn,
            tag: &self.name,
            line: 0,
            message,
        };
        match &self.sink {
            Some(sink) => sink.log(&record),
            None => TracingSink.log(&record),
        }
    }

    fn fail(&mut self, err: SpecError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Identifiers and keywords match without regard to ASCII case.
    #[must_use]
    pub fn case_insensitive(mut self) -> Self {
        self.case = CaseMode::Insensitive;
        self
    }

    /// Keyword hash table size and weights.
    #[must_use]
    pub fn keyword_hash(mut self, slots: usize, weights: HashWeights) -> Self {
        self.slots = slots.max(1);
        self.weights = weights;
        self
    }

    /// Replace the classes of an ASCII byte.
    #[must_use]
    pub fn char_class(mut self, byte: u8, class: CharClass) -> Self {
        self.chars.set(byte, class);
        self
    }

    /// Let these characters start and continue identifiers.
    #[must_use]
    pub fn id_first_chars(mut self, chars: &str) -> Self {
        for b in chars.bytes() {
            self.chars.insert(b, CharClass::ID_FIRST | CharClass::ID);
        }
        self
    }

    /// Let these characters continue identifiers.
    #[must_use]
    pub fn id_chars(mut self, chars: &str) -> Self {
        for b in chars.bytes() {
            self.chars.insert(b, CharClass::ID);
        }
        self
    }

    /// Treat these ASCII characters as whitespace.
    #[must_use]
    pub fn blank_chars(mut self, chars: &str) -> Self {
        for b in chars.bytes() {
            self.chars.set(b, CharClass::empty());
        }
        self
    }

    /// Whether code points `>= 0x80` may appear in identifiers.
    #[must_use]
    pub fn non_ascii_ids(mut self, allowed: bool) -> Self {
        self.chars.set_non_ascii_ids(allowed);
        self
    }

    /// Register a token spelling.
    ///
    /// Spellings sharing an id share one view; `name` then becomes an alias.
    /// An empty `text` only registers the name and id.
    #[must_use]
    pub fn token(mut self, name: &str, text: &str, id: TokenId) -> Self {
        let view = match self.arena.find_by_id(id) {
            Some(view) => {
                if &*self.arena.get(view).name != name {
                    if let Err(err) = self.arena.add_alias(view, name) {
                        self.fail(err.into());
                    }
                }
                view
            }
            None => match self.arena.add(id, name) {
                Ok(view) => view,
                Err(err) => {
                    self.fail(err.into());
                    return self;
                }
            },
        };
        if !text.is_empty() {
            self.tokens.push((text.into(), view));
        }
        self
    }

    /// Add an alias name to the token called `name`.
    #[must_use]
    pub fn alias(mut self, name: &str, alias: &str) -> Self {
        match self.arena.find_by_name(name) {
            Some(view) => {
                if let Err(err) = self.arena.add_alias(view, alias) {
                    self.fail(err.into());
                }
            }
            None => self.fail(SpecError::UnknownName(name.into())),
        }
        self
    }

    /// Move a token from one id to another (reserved tokens included).
    #[must_use]
    pub fn rename_token(mut self, old: TokenId, new: TokenId) -> Self {
        if let Err(err) = self.arena.rename(old, new) {
            self.fail(err.into());
        }
        self
    }

    /// Give a reserved token a different id.
    #[must_use]
    pub fn reserved_id(self, which: Reserved, id: TokenId) -> Self {
        let old = self.arena.reserved().id(which);
        self.rename_token(old, id)
    }

    #[must_use]
    pub fn quote(mut self, quote: QuoteDef) -> Self {
        self.quotes.push(quote);
        self
    }

    #[must_use]
    pub fn comment(mut self, start: &str, end: &str, flags: CommentFlags) -> Self {
        self.comments.push((start.to_owned(), end.to_owned(), flags));
        self
    }

    /// A line comment starting with `start`.
    #[must_use]
    pub fn line_comment(self, start: &str) -> Self {
        self.comment(start, "\n", CommentFlags::ONE_LINE)
    }

    #[must_use]
    pub fn radix_prefix(mut self, prefix: &str, radix: u32) -> Self {
        let valid = (2..=16).contains(&radix)
            && (1..=RADIX_PREFIX_MAX).contains(&prefix.len())
            && prefix.as_bytes()[0].is_ascii_digit();
        if !valid {
            self.fail(SpecError::RadixPrefix {
                prefix: prefix.into(),
                radix,
            });
        } else if self.numbers.prefixes.len() == MAX_RADIX_PREFIXES {
            self.fail(SpecError::TooManyPrefixes);
        } else {
            self.numbers.prefixes.push(RadixPrefix {
                text: prefix.as_bytes().into(),
                radix,
            });
        }
        self
    }

    #[must_use]
    pub fn number_suffix(mut self, suffix: &str) -> Self {
        let valid = !suffix.is_empty()
            && suffix
                .bytes()
                .all(|b| !b.is_ascii() || b.is_ascii_alphanumeric() || b == b'_');
        if valid {
            self.numbers.suffixes.push(suffix.into());
        } else {
            self.fail(SpecError::NumberSuffix(suffix.into()));
        }
        self
    }

    /// Digit group separator such as `_` in `1_000`.
    #[must_use]
    pub fn decimal_separator(mut self, sep: u8) -> Self {
        self.numbers.separator = Some(sep);
        self
    }

    /// Whether `.5` scans as a number (default on).
    #[must_use]
    pub fn leading_dot_numbers(mut self, on: bool) -> Self {
        self.numbers.leading_dot = on;
        self
    }

    /// Read `-5` as one number (on by default) or as `-` then `5`.
    #[must_use]
    pub fn signed_numbers(mut self, on: bool) -> Self {
        self.signed_numbers = on;
        self
    }

    /// Fold a `-` directly before an identifier into its lexeme.
    #[must_use]
    pub fn fold_minus(mut self, on: bool) -> Self {
        self.fold_minus = on;
        self
    }

    /// Identifier length limits; longer identifiers are reported as errors.
    #[must_use]
    pub fn id_max_len(mut self, bytes: Option<usize>, chars: Option<usize>) -> Self {
        self.id_max_bytes = bytes;
        self.id_max_chars = chars;
        self
    }

    fn is_identifier(&self, text: &str) -> bool {
        let mut chars = text.chars();
        chars
            .next()
            .is_some_and(|c| self.chars.class_of(u32::from(c)).contains(CharClass::ID_FIRST))
            && chars.all(|c| self.chars.class_of(u32::from(c)).contains(CharClass::ID))
    }

    fn quote_type(&mut self, def: QuoteDef) -> Result<QuoteType, SpecError> {
        let bad = |reason| SpecError::QuoteMark {
            mark: def.start.as_str().into(),
            reason,
        };
        let Some(first) = def.start.chars().next() else {
            return Err(bad("empty start mark"));
        };
        if def.start.len() > QUOTE_MARK_MAX || def.end.len() > QUOTE_MARK_MAX {
            return Err(bad("marks are limited to 7 bytes"));
        }
        if self
            .chars
            .class_of(u32::from(first))
            .contains(CharClass::ID_FIRST)
            && first.is_ascii()
        {
            return Err(bad("start mark begins with an identifier character"));
        }
        if def.start == "." {
            return Err(bad("a lone `.` cannot start a literal"));
        }
        let bodyless = def.flags.intersects(QuoteFlags::NOTHING | QuoteFlags::OPEN);
        if def.end.is_empty() && !bodyless {
            return Err(bad("empty end mark"));
        }

        let view = if def.flags.contains(QuoteFlags::NOTHING) {
            self.arena.reserved().view(Reserved::None)
        } else {
            let id = def.id.unwrap_or_else(|| TokenId::from_char(u32::from(first)));
            let name = def.name.clone().unwrap_or_else(|| def.start.clone());
            self.arena.get_or_add(id, &name)?
        };

        let mut quote = QuoteType::new(&def.start, &def.end, view).with_flags(def.flags);
        if let Some(escapes) = def.escapes {
            quote = quote.with_escapes(escapes);
        }
        if let Some(analyzer) = def.analyzer {
            quote = quote.with_analyzer(analyzer);
        }
        if let Ok(b) = u8::try_from(u32::from(first)) {
            self.chars.insert(b, CharClass::QUOTE);
        }
        Ok(quote)
    }

    fn comment_type(
        &mut self,
        (start, end, flags): (String, String, CommentFlags),
    ) -> Result<CommentType, SpecError> {
        let bad = |reason| SpecError::CommentMark {
            mark: start.as_str().into(),
            reason,
        };
        if start.is_empty() || end.is_empty() {
            return Err(bad("empty mark"));
        }
        if start.len() > COMMENT_MARK_MAX || end.len() > COMMENT_MARK_MAX {
            return Err(bad("marks are limited to 30 bytes"));
        }
        let mut flags = flags;
        if end == "\n" {
            flags |= CommentFlags::ONE_LINE;
        }
        self.chars.insert(start.as_bytes()[0], CharClass::COMMENT);
        Ok(CommentType {
            start: start.as_bytes().into(),
            end: end.as_bytes().into(),
            flags,
        })
    }

    /// Validate and freeze the specification.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %self.name))]
    pub fn build(mut self) -> Result<Arc<LexSpec>, SpecError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.quotes.len() > MAX_QUOTE_TYPES {
            return Err(SpecError::TooManyQuotes);
        }
        if self.comments.len() > MAX_COMMENT_TYPES {
            return Err(SpecError::TooManyComments);
        }

        let mut quotes = Vec::with_capacity(self.quotes.len());
        for def in std::mem::take(&mut self.quotes) {
            quotes.push(self.quote_type(def)?);
        }
        quotes.sort_by_key(|q| std::cmp::Reverse(q.start().len()));

        let mut comments = Vec::with_capacity(self.comments.len());
        for def in std::mem::take(&mut self.comments) {
            comments.push(self.comment_type(def)?);
        }
        comments.sort_by_key(|c| std::cmp::Reverse(c.start().len()));

        let mut keywords = KeywordTable::new(self.slots, self.weights, self.case);
        let mut onechars = OneCharTable::new();
        let mut twoplus = TwoPlusTable::new(self.case);
        for (text, view) in std::mem::take(&mut self.tokens) {
            let single = utf8::char_count(text.as_bytes()) == 1;
            if !(single && !text.is_ascii()) && self.is_identifier(&text) {
                if !keywords.insert(TokenDef::new(text.clone(), view)) {
                    return Err(SpecError::DuplicateKeyword(text));
                }
            } else if single {
                let ch = text.chars().next().map_or(0, u32::from);
                if onechars.insert(ch, view).is_some_and(|prev| prev != view) {
                    self.warn(format_args!(
                        "one-char token `{text}` redefined, the later definition wins"
                    ));
                }
                self.chars.insert(text.as_bytes()[0], CharClass::ONE_CHAR);
            } else {
                for b in text.bytes() {
                    self.chars.insert(b, CharClass::TWO_PLUS);
                }
                twoplus.add(TokenDef::new(text, view))?;
            }
        }
        twoplus.distribute();

        self.numbers
            .prefixes
            .sort_by_key(|p| std::cmp::Reverse(p.text.len()));
        self.numbers
            .suffixes
            .sort_by_key(|s| std::cmp::Reverse(s.len()));

        let lookahead = quotes
            .iter()
            .flat_map(|q| [q.start().len(), q.end().len()])
            .chain(comments.iter().flat_map(|c| [c.start().len(), c.end().len()]))
            .fold(MIN_LOOKAHEAD, usize::max);

        tracing::debug!(
            keywords = keywords.len(),
            twoplus = twoplus.len(),
            quotes = quotes.len(),
            comments = comments.len(),
            "specification built"
        );

        Ok(Arc::new(LexSpec {
            name: self.name,
            chars: self.chars,
            arena: self.arena,
            keywords,
            onechars,
            twoplus,
            quotes,
            comments,
            numbers: self.numbers,
            signed_numbers: self.signed_numbers,
            fold_minus: self.fold_minus,
            id_max_bytes: self.id_max_bytes,
            id_max_chars: self.id_max_chars,
            lookahead,
        }))
    }
}
