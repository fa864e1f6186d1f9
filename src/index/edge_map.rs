//! Per-node map from a leading character to an outgoing edge
//!
//! Fan-out is bounded by the alphabet and usually tiny, so the map is a flat
//! vector of `(char, EdgeId)` pairs. Up to [`SORTED_THRESHOLD`] entries are kept
//! in insertion order and scanned linearly. Past the threshold the entries are
//! kept sorted by character and looked up with binary search; every later `put`
//! inserts at its sorted position.

use super::types::EdgeId;

/// Number of entries above which the map switches to sorted storage
pub const SORTED_THRESHOLD: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeMap {
    entries: Vec<(char, EdgeId)>,
}

impl EdgeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `ch` to `edge`, replacing any previous mapping for `ch`
    pub fn put(&mut self, ch: char, edge: EdgeId) {
        if let Some(idx) = self.position(ch) {
            self.entries[idx].1 = edge;
            return;
        }

        if self.is_sorted_regime() {
            let idx = self
                .entries
                .binary_search_by_key(&ch, |&(c, _)| c)
                .unwrap_or_else(|idx| idx);
            self.entries.insert(idx, (ch, edge));
        } else {
            self.entries.push((ch, edge));
            if self.is_sorted_regime() {
                self.entries.sort_unstable_by_key(|&(c, _)| c);
            }
        }
    }

    /// Edge whose label starts with `ch`
    #[inline]
    pub fn get(&self, ch: char) -> Option<EdgeId> {
        self.position(ch).map(|idx| self.entries[idx].1)
    }

    #[inline]
    fn position(&self, ch: char) -> Option<usize> {
        if self.is_sorted_regime() {
            self.entries.binary_search_by_key(&ch, |&(c, _)| c).ok()
        } else {
            self.entries.iter().position(|&(c, _)| c == ch)
        }
    }

    #[inline]
    fn is_sorted_regime(&self) -> bool {
        self.entries.len() > SORTED_THRESHOLD
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in storage order
    pub fn iter(&self) -> impl Iterator<Item = (char, EdgeId)> + '_ {
        self.entries.iter().copied()
    }

    /// Edge ids in storage order
    pub fn values(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.entries.iter().map(|&(_, e)| e)
    }
}
