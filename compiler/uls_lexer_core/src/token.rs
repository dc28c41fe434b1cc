//! Token identities.
//!
//! # Design
//!
//! A [`TokenView`] is the user-visible identity of a token id: the numeric
//! id, a display name and any alias names. Views live in a [`TokenArena`]
//! and are addressed by [`ViewId`], so lookup tables and quote types refer to
//! them by index instead of by pointer.
//!
//! A [`TokenDef`] is one spelling of a token (a keyword or operator text)
//! pointing at its view. Several defs may share a view (aliases), and a view
//! may exist without any def (reserved tokens, quote tokens).

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Numeric token id returned by the lexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TokenId(pub i32);

impl TokenId {
    /// Id used for a character token: its code point.
    #[inline]
    pub fn from_char(ch: u32) -> Self {
        Self(i32::try_from(ch).unwrap_or(i32::MAX))
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Index of a [`TokenView`] in its [`TokenArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u32);

impl ViewId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// User-visible identity of a token id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenView {
    /// Numeric id.
    pub id: TokenId,
    /// Display name, e.g. `"LE"` or `"ID"`.
    pub name: Box<str>,
    /// Additional names resolving to the same view.
    pub aliases: SmallVec<[Box<str>; 2]>,
}

/// One spelling of a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenDef {
    /// Canonical keyword text.
    pub keyword: Box<str>,
    /// View this spelling yields.
    pub view: ViewId,
}

impl TokenDef {
    pub fn new(keyword: impl Into<Box<str>>, view: ViewId) -> Self {
        Self {
            keyword: keyword.into(),
            view,
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.keyword.as_bytes()
    }
}

/// Reserved tokens every specification carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reserved {
    /// End of all input.
    Eoi,
    /// End of one pushed source (only returned when requested).
    Eof,
    /// Identifier.
    Id,
    /// Number.
    Number,
    /// Line-number record in a replayed token stream.
    LineNum,
    /// Template placeholder.
    Tmpl,
    /// Link record.
    Link,
    /// No token (after an unget of raw text).
    None,
    /// Lexical error.
    Err,
}

impl Reserved {
    pub const ALL: [Reserved; 9] = [
        Reserved::Eoi,
        Reserved::Eof,
        Reserved::Id,
        Reserved::Number,
        Reserved::LineNum,
        Reserved::Tmpl,
        Reserved::Link,
        Reserved::None,
        Reserved::Err,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Default name of the reserved token.
    pub fn name(self) -> &'static str {
        match self {
            Reserved::Eoi => "EOI",
            Reserved::Eof => "EOF",
            Reserved::Id => "ID",
            Reserved::Number => "NUMBER",
            Reserved::LineNum => "LINENUM",
            Reserved::Tmpl => "TMPL",
            Reserved::Link => "LINK",
            Reserved::None => "NONE",
            Reserved::Err => "ERR",
        }
    }

    /// Default id: `0` for EOI, then `-1`, `-2`, ... in declaration order.
    pub fn default_id(self) -> TokenId {
        TokenId(-i32::from(self as u8))
    }
}

/// Reserved token ids of one specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReservedIds {
    ids: [TokenId; 9],
    views: [ViewId; 9],
}

impl ReservedIds {
    #[inline]
    pub fn id(&self, which: Reserved) -> TokenId {
        self.ids[which.index()]
    }

    #[inline]
    pub fn view(&self, which: Reserved) -> ViewId {
        self.views[which.index()]
    }

    /// Which reserved token carries `id`, if any.
    pub fn classify(&self, id: TokenId) -> Option<Reserved> {
        Reserved::ALL.into_iter().find(|r| self.ids[r.index()] == id)
    }
}

/// Errors raised while registering views.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// The name (or alias) already resolves to another view.
    #[error("token name `{0}` is already defined")]
    DuplicateName(Box<str>),
    /// The id is already carried by another view.
    #[error("token id {0} is already defined")]
    DuplicateId(TokenId),
    /// No view carries the given id.
    #[error("no token with id {0}")]
    UnknownId(TokenId),
}

/// Owner of all token views of one specification.
#[derive(Clone, Debug)]
pub struct TokenArena {
    views: Vec<TokenView>,
    by_id: FxHashMap<TokenId, ViewId>,
    by_name: FxHashMap<Box<str>, ViewId>,
    reserved: ReservedIds,
}

impl Default for TokenArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenArena {
    /// Arena holding the nine reserved views with their default ids.
    pub fn new() -> Self {
        let mut arena = Self {
            views: Vec::new(),
            by_id: FxHashMap::default(),
            by_name: FxHashMap::default(),
            reserved: ReservedIds {
                ids: [TokenId(0); 9],
                views: [ViewId(0); 9],
            },
        };
        for which in Reserved::ALL {
            let view = arena.push_view(which.default_id(), which.name());
            arena.reserved.ids[which.index()] = which.default_id();
            arena.reserved.views[which.index()] = view;
        }
        arena
    }

    fn push_view(&mut self, id: TokenId, name: &str) -> ViewId {
        let view = ViewId(u32::try_from(self.views.len()).unwrap_or(u32::MAX));
        self.views.push(TokenView {
            id,
            name: name.into(),
            aliases: SmallVec::new(),
        });
        self.by_id.insert(id, view);
        self.by_name.insert(name.into(), view);
        view
    }

    /// Register a new view.
    pub fn add(&mut self, id: TokenId, name: &str) -> Result<ViewId, ArenaError> {
        if self.by_name.contains_key(name) {
            return Err(ArenaError::DuplicateName(name.into()));
        }
        if self.by_id.contains_key(&id) {
            return Err(ArenaError::DuplicateId(id));
        }
        Ok(self.push_view(id, name))
    }

    /// View for `id`, registering it under `name` when absent.
    ///
    /// Several spellings of one id share the view created first.
    pub fn get_or_add(&mut self, id: TokenId, name: &str) -> Result<ViewId, ArenaError> {
        if let Some(&view) = self.by_id.get(&id) {
            return Ok(view);
        }
        self.add(id, name)
    }

    /// Add an alias name to an existing view.
    pub fn add_alias(&mut self, view: ViewId, alias: &str) -> Result<(), ArenaError> {
        match self.by_name.get(alias) {
            Some(&existing) if existing == view => return Ok(()),
            Some(_) => return Err(ArenaError::DuplicateName(alias.into())),
            None => {}
        }
        self.by_name.insert(alias.into(), view);
        self.views[view.index()].aliases.push(alias.into());
        Ok(())
    }

    /// Move the view carrying `old` to `new`.
    pub fn rename(&mut self, old: TokenId, new: TokenId) -> Result<ViewId, ArenaError> {
        let view = self.by_id.get(&old).copied().ok_or(ArenaError::UnknownId(old))?;
        if old == new {
            return Ok(view);
        }
        if self.by_id.contains_key(&new) {
            return Err(ArenaError::DuplicateId(new));
        }
        self.by_id.remove(&old);
        self.by_id.insert(new, view);
        self.views[view.index()].id = new;
        if let Some(which) = self.reserved.classify(old) {
            self.reserved.ids[which.index()] = new;
        }
        Ok(view)
    }

    #[inline]
    pub fn get(&self, view: ViewId) -> &TokenView {
        &self.views[view.index()]
    }

    #[inline]
    pub fn id_of(&self, view: ViewId) -> TokenId {
        self.views[view.index()].id
    }

    pub fn find_by_id(&self, id: TokenId) -> Option<ViewId> {
        self.by_id.get(&id).copied()
    }

    /// Find a view by its name or one of its aliases.
    pub fn find_by_name(&self, name: &str) -> Option<ViewId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn reserved(&self) -> &ReservedIds {
        &self.reserved
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ViewId, &TokenView)> {
        (0u32..).zip(&self.views).map(|(i, v)| (ViewId(i), v))
    }
}
