//! Multi-character operator table.
//!
//! # Design
//!
//! Definitions are pooled with [`TwoPlusTable::add`] and then arranged by
//! [`TwoPlusTable::distribute`] into one tree per keyword length. Each tree
//! is sorted by keyword for binary search and links to the next shorter
//! non-empty tree, so a lookup starting at the longest plausible length walks
//! down to shorter ones and the first hit is the longest match (`<<=` before
//! `<<` before `<`).
//!
//! The starting length is bounded by how far the input stays on multi-char
//! eligible characters, so `<< x` never probes the length-3 tree.

use std::cmp::Ordering;

use crate::char_class::{CharClass, CharTable};
use crate::keyword_table::CaseMode;
use crate::token::TokenDef;

/// Shortest multi-char keyword.
pub const MIN_LEN: usize = 2;
/// Longest multi-char keyword.
pub const MAX_LEN: usize = 15;

/// Keywords of one length, sorted.
#[derive(Clone, Debug, Default)]
struct LengthTree {
    entries: Vec<TokenDef>,
    /// Next shorter non-empty tree, by length.
    shorter: Option<usize>,
}

/// Errors raised when adding a multi-char keyword.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TwoPlusError {
    #[error("multi-char token `{0}` must be {MIN_LEN}..={MAX_LEN} bytes long")]
    BadLength(Box<str>),
    #[error("multi-char token `{0}` is defined twice")]
    Duplicate(Box<str>),
}

/// Longest-match table for fixed operator keywords.
#[derive(Clone, Debug, Default)]
pub struct TwoPlusTable {
    pool: Vec<TokenDef>,
    /// Indexed by `len - MIN_LEN`.
    trees: Vec<LengthTree>,
    longest: Option<usize>,
    case: CaseMode,
}

impl TwoPlusTable {
    pub fn new(case: CaseMode) -> Self {
        Self {
            case,
            ..Self::default()
        }
    }

    /// Pool a definition. Takes effect after [`distribute`](Self::distribute).
    pub fn add(&mut self, def: TokenDef) -> Result<(), TwoPlusError> {
        let len = def.bytes().len();
        if !(MIN_LEN..=MAX_LEN).contains(&len) {
            return Err(TwoPlusError::BadLength(def.keyword));
        }
        if self
            .pool
            .iter()
            .any(|d| self.case.eq(d.bytes(), def.bytes()))
        {
            return Err(TwoPlusError::Duplicate(def.keyword));
        }
        self.pool.push(def);
        Ok(())
    }

    /// Arrange the pooled definitions into sorted per-length trees.
    pub fn distribute(&mut self) {
        let case = self.case;
        let mut pool = self.pool.clone();
        pool.sort_by(|a, b| {
            b.bytes()
                .len()
                .cmp(&a.bytes().len())
                .then_with(|| case.cmp(a.bytes(), b.bytes()))
        });

        self.trees = vec![LengthTree::default(); MAX_LEN - MIN_LEN + 1];
        for def in pool {
            let slot = def.bytes().len() - MIN_LEN;
            self.trees[slot].entries.push(def);
        }

        self.longest = None;
        let mut shorter = None;
        for (slot, tree) in self.trees.iter_mut().enumerate() {
            tree.shorter = shorter;
            if !tree.entries.is_empty() {
                shorter = Some(slot);
                self.longest = Some(slot);
            }
        }
    }

    /// Length of the longest keyword, if any.
    pub fn longest(&self) -> Option<usize> {
        self.longest.map(|slot| slot + MIN_LEN)
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Longest keyword that prefixes `text`.
    ///
    /// The scan bound stops at the first character whose class lacks
    /// [`CharClass::TWO_PLUS`]; non-ASCII characters are always eligible.
    pub fn find(&self, chars: &CharTable, text: &[u8]) -> Option<&TokenDef> {
        let longest = self.longest?;
        let limit = text.len().min(longest + MIN_LEN);
        let eligible = text[..limit]
            .iter()
            .position(|&b| !chars.class_of_byte(b).contains(CharClass::TWO_PLUS))
            .unwrap_or(limit);
        if eligible < MIN_LEN {
            return None;
        }

        // Start at the tree for `eligible`, or the next shorter non-empty one.
        let start = eligible - MIN_LEN;
        let mut slot = if self.trees[start].entries.is_empty() {
            self.trees[start].shorter
        } else {
            Some(start)
        };

        while let Some(s) = slot {
            let tree = &self.trees[s];
            let len = s + MIN_LEN;
            let probe = &text[..len];
            if let Ok(i) = tree
                .entries
                .binary_search_by(|e| self.cmp_entry(e.bytes(), probe))
            {
                return Some(&tree.entries[i]);
            }
            slot = tree.shorter;
        }
        None
    }

    #[inline]
    fn cmp_entry(&self, entry: &[u8], probe: &[u8]) -> Ordering {
        self.case.cmp(entry, probe)
    }

    /// All distributed definitions, longest first.
    pub fn iter(&self) -> impl Iterator<Item = &TokenDef> {
        self.trees.iter().rev().flat_map(|t| t.entries.iter())
    }
}
