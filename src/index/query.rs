//! Read-only queries over an arena
//!
//! Shared by the build-phase tree and the frozen [`SuffixIndex`](super::SuffixIndex).

use super::arena::Arena;
use super::types::{NodeId, ROOT};
use roaring::RoaringBitmap;

/// Node at the end of the edge on which `word` ends, if `word` is spelled by
/// some path from the root. The empty word locates nothing.
pub fn locate(arena: &Arena, word: &str) -> Option<NodeId> {
    let mut node = ROOT;
    let mut rest = word;
    loop {
        let first = rest.chars().next()?;
        let edge = arena.child(node, first)?;
        let label = edge.label();
        if rest.len() <= label.len() {
            return label.starts_with(rest).then_some(edge.dest());
        }
        rest = rest.strip_prefix(label)?;
        node = edge.dest();
    }
}

/// Identifiers of every key containing `word`
pub fn search<'a>(arena: &'a Arena, word: &str) -> Option<&'a RoaringBitmap> {
    locate(arena, word).map(|node| arena.node(node).ids())
}

/// Longest prefix of `word` spelled by a path from the root
pub fn match_prefix<'w>(arena: &Arena, word: &'w str) -> &'w str {
    let mut node = ROOT;
    let mut matched = 0;
    while let Some(first) = word[matched..].chars().next() {
        let Some(edge) = arena.child(node, first) else {
            break;
        };
        let label = edge.label();
        let common = common_prefix_len(label, &word[matched..]);
        matched += common;
        if common < label.len() {
            break;
        }
        node = edge.dest();
    }
    &word[..matched]
}

/// Longest substring of `text` that occurs in some key. Ties go to the
/// earliest occurrence in `text`.
pub fn longest_substring<'w>(arena: &Arena, text: &'w str) -> &'w str {
    let mut best = "";
    for (start, _) in text.char_indices() {
        if text.len() - start <= best.len() {
            break;
        }
        let found = match_prefix(arena, &text[start..]);
        if found.len() > best.len() {
            best = found;
        }
    }
    best
}

/// Byte length of the longest common prefix, on character boundaries
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|&((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((idx, _), _)| idx)
}
