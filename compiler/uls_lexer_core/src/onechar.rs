//! Single-character token table.
//!
//! Printable ASCII punctuation is split into four dense groups:
//!
//! | group | range        | size |
//! |-------|--------------|------|
//! | 0     | `!` ..= `/`  | 15   |
//! | 1     | `:` ..= `@`  | 7    |
//! | 2     | `[` ..= `` ` `` | 6 |
//! | 3     | `{` ..= `~`  | 4    |
//!
//! The groups form a small search tree rooted at group 0: characters below a
//! group's range go to its left child, characters above to its right child.
//! A character that falls between or outside every range is kept in an
//! overflow list searched linearly.

use crate::token::ViewId;

/// `(first char, size)` of each group.
const GROUPS: [(u32, usize); 4] = [(0x21, 15), (0x3A, 7), (0x5B, 6), (0x7B, 4)];
const LEFT_CHILD: [Option<usize>; 4] = [None, None, Some(1), None];
const RIGHT_CHILD: [Option<usize>; 4] = [Some(2), None, Some(3), None];

/// Where a character lives in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Group { group: usize, index: usize },
    Overflow,
}

/// Single-character token table.
#[derive(Clone, Debug)]
pub struct OneCharTable {
    groups: [Vec<Option<ViewId>>; 4],
    overflow: Vec<(u32, ViewId)>,
}

impl Default for OneCharTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OneCharTable {
    pub fn new() -> Self {
        Self {
            groups: GROUPS.map(|(_, size)| vec![None; size]),
            overflow: Vec::new(),
        }
    }

    fn locate(ch: u32) -> Slot {
        let mut group = Some(0);
        while let Some(g) = group {
            let (first, size) = GROUPS[g];
            if ch < first {
                group = LEFT_CHILD[g];
            } else if ch >= first + u32::try_from(size).unwrap_or(0) {
                group = RIGHT_CHILD[g];
            } else {
                return Slot::Group {
                    group: g,
                    index: (ch - first) as usize,
                };
            }
        }
        Slot::Overflow
    }

    /// Register `ch`.
    ///
    /// Returns the view previously stored for `ch`, which is overwritten.
    /// The caller decides whether that is worth a diagnostic.
    pub fn insert(&mut self, ch: u32, view: ViewId) -> Option<ViewId> {
        match Self::locate(ch) {
            Slot::Group { group, index } => self.groups[group][index].replace(view),
            Slot::Overflow => {
                if let Some(entry) = self.overflow.iter_mut().find(|(c, _)| *c == ch) {
                    Some(std::mem::replace(&mut entry.1, view))
                } else {
                    self.overflow.push((ch, view));
                    None
                }
            }
        }
    }

    /// View registered for `ch`.
    #[inline]
    pub fn find(&self, ch: u32) -> Option<ViewId> {
        match Self::locate(ch) {
            Slot::Group { group, index } => self.groups[group][index],
            Slot::Overflow => self
                .overflow
                .iter()
                .find_map(|&(c, view)| (c == ch).then_some(view)),
        }
    }

    /// Overflow character registered with `view`, if any.
    pub fn find_overflow_by_view(&self, view: ViewId) -> Option<u32> {
        self.overflow
            .iter()
            .find_map(|&(c, v)| (v == view).then_some(c))
    }

    /// Every registered `(char, view)` pair, grouped characters first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, ViewId)> + '_ {
        let grouped = self.groups.iter().zip(GROUPS).flat_map(|(slots, (first, _))| {
            (first..)
                .zip(slots)
                .filter_map(|(ch, slot)| slot.map(|view| (ch, view)))
        });
        grouped.chain(self.overflow.iter().copied())
    }
}
