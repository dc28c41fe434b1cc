//! Identifier keyword table.
//!
//! A fixed number of hash buckets, each a chain of [`TokenDef`]s. The most
//! recently inserted definition sits at the head of its chain (the end of
//! the bucket vector), and a keyword text appears in at most one chain.
//!
//! # Hashing
//!
//! The hash folds bytes left to right: `h = (h << 1) ^ (byte * w[i % 3])`
//! with a three-entry weight vector reused every third byte. The result is
//! reduced with `(h % size + size) % size` so a negative intermediate never
//! yields a negative slot. In case-insensitive mode bytes are uppercased
//! before weighting and before comparison.

use std::cmp::Ordering;

use crate::token::{TokenDef, ViewId};

/// Default number of hash buckets.
pub const DEFAULT_SLOTS: usize = 111;

/// Case handling of identifier keywords.
///
/// The hash and the comparator are bound together here so switching case
/// sensitivity always switches both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CaseMode {
    #[default]
    Sensitive,
    Insensitive,
}

impl CaseMode {
    #[inline]
    fn fold(self, byte: u8) -> u8 {
        match self {
            CaseMode::Sensitive => byte,
            CaseMode::Insensitive => byte.to_ascii_uppercase(),
        }
    }

    /// Slot of `text` in a table of `n_slots` buckets.
    pub fn hash(self, text: &[u8], weights: HashWeights, n_slots: usize) -> usize {
        let mut h: i32 = 0;
        for (i, &byte) in text.iter().enumerate() {
            let w = weights.0[i % 3];
            h = h.wrapping_shl(1) ^ i32::from(self.fold(byte)).wrapping_mul(w);
        }
        let size = i64::try_from(n_slots.max(1)).unwrap_or(i64::MAX);
        let slot = (i64::from(h) % size + size) % size;
        usize::try_from(slot).unwrap_or(0)
    }

    /// Equality under this mode. Texts of different lengths never match.
    #[inline]
    pub fn eq(self, a: &[u8], b: &[u8]) -> bool {
        match self {
            CaseMode::Sensitive => a == b,
            CaseMode::Insensitive => a.eq_ignore_ascii_case(b),
        }
    }

    /// Ordering under this mode.
    pub fn cmp(self, a: &[u8], b: &[u8]) -> Ordering {
        match self {
            CaseMode::Sensitive => a.cmp(b),
            CaseMode::Insensitive => a
                .iter()
                .map(u8::to_ascii_uppercase)
                .cmp(b.iter().map(u8::to_ascii_uppercase)),
        }
    }
}

/// Weights applied cyclically to the bytes of a keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HashWeights(pub [i32; 3]);

impl Default for HashWeights {
    fn default() -> Self {
        Self([1, 2, 4])
    }
}

/// Hash table from identifier text to its definition.
#[derive(Clone, Debug)]
pub struct KeywordTable {
    buckets: Vec<Vec<TokenDef>>,
    weights: HashWeights,
    case: CaseMode,
    len: usize,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS, HashWeights::default(), CaseMode::Sensitive)
    }
}

impl KeywordTable {
    pub fn new(n_slots: usize, weights: HashWeights, case: CaseMode) -> Self {
        Self {
            buckets: vec![Vec::new(); n_slots.max(1)],
            weights,
            case,
            len: 0,
        }
    }

    #[inline]
    fn slot(&self, text: &[u8]) -> usize {
        self.case.hash(text, self.weights, self.buckets.len())
    }

    /// Insert a definition.
    ///
    /// Returns `false` (and leaves the table unchanged) if a definition with
    /// the same text is already present; the first insertion wins.
    pub fn insert(&mut self, def: TokenDef) -> bool {
        if self.find(def.bytes()).is_some() {
            return false;
        }
        let slot = self.slot(def.bytes());
        self.buckets[slot].push(def);
        self.len += 1;
        true
    }

    /// Look up `text`, head of the chain first.
    pub fn find(&self, text: &[u8]) -> Option<&TokenDef> {
        let slot = self.slot(text);
        self.buckets[slot]
            .iter()
            .rev()
            .find(|def| self.case.eq(def.bytes(), text))
    }

    #[inline]
    pub fn case(&self) -> CaseMode {
        self.case
    }

    /// Switch case sensitivity, rehashing every definition.
    ///
    /// Definitions that collide under the new mode are dropped (the one
    /// inserted earlier in its chain wins) and returned.
    pub fn set_case(&mut self, case: CaseMode) -> Vec<TokenDef> {
        if case == self.case {
            return Vec::new();
        }
        let slots = self.buckets.len();
        let old = std::mem::replace(&mut self.buckets, vec![Vec::new(); slots]);
        self.case = case;
        self.len = 0;
        let mut dropped = Vec::new();
        for def in old.into_iter().flatten() {
            if self.find(def.bytes()).is_some() {
                dropped.push(def);
            } else {
                let slot = self.slot(def.bytes());
                self.buckets[slot].push(def);
                self.len += 1;
            }
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All definitions, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &TokenDef> {
        self.buckets.iter().flatten()
    }

    /// Length of the longest chain.
    pub fn max_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Snapshot sorted by keyword, each entry with a zeroed frequency.
    pub fn export(&self) -> KeywordExport {
        let case = self.case;
        let mut entries: Vec<KeywordStat> = self
            .iter()
            .map(|def| KeywordStat {
                keyword: def.keyword.clone(),
                view: def.view,
                freq: 0,
            })
            .collect();
        entries.sort_by(|a, b| {
            case.cmp(a.keyword.as_bytes(), b.keyword.as_bytes())
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        KeywordExport { entries, case }
    }
}

/// One exported keyword with its usage counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordStat {
    pub keyword: Box<str>,
    pub view: ViewId,
    pub freq: u32,
}

/// Sorted keyword snapshot for frequency profiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordExport {
    entries: Vec<KeywordStat>,
    case: CaseMode,
}

impl KeywordExport {
    pub fn entries(&self) -> &[KeywordStat] {
        &self.entries
    }

    fn position(&self, text: &[u8]) -> Option<usize> {
        self.entries
            .binary_search_by(|e| self.case.cmp(e.keyword.as_bytes(), text))
            .ok()
    }

    /// Binary search by keyword text.
    pub fn find(&self, text: &[u8]) -> Option<&KeywordStat> {
        self.position(text).map(|i| &self.entries[i])
    }

    /// Count one occurrence of `text`. Returns `false` for unknown text.
    pub fn bump(&mut self, text: &[u8]) -> bool {
        match self.position(text) {
            Some(i) => {
                self.entries[i].freq = self.entries[i].freq.saturating_add(1);
                true
            }
            None => false,
        }
    }
}
