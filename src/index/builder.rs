//! Generalized suffix tree construction
//!
//! Online construction in the style of Ukkonen's "On-line construction of
//! suffix trees", extended so that many independent keys can be inserted into
//! one tree. Each key is added one character at a time while the engine keeps a
//! canonical reference pair `(node, remainder)` for the longest suffix of the
//! processed text that is not yet a leaf.
//!
//! Unlike the single-string algorithm, leaf edges are labeled with the whole
//! rest of the key when they are created, and a leaf for the current
//! extension may already exist because an earlier key built deeper structure.

use super::arena::{Arena, Node};
use super::reader::SuffixIndex;
use super::types::{
    EdgeId, FORMAT_VERSION, IndexMeta, KeyId, NodeId, Propagation, ROOT, TreeConfig, TreeStats,
};
use crate::error::{Error, Result};
use log::trace;
use roaring::RoaringBitmap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Build-phase generalized suffix tree
///
/// Keys are inserted sequentially with non-decreasing identifiers. Once all
/// keys are in, [`freeze`](Self::freeze) seals the tree into an immutable
/// [`SuffixIndex`] that can be shared between readers and persisted.
#[derive(Debug, Clone)]
pub struct GeneralizedSuffixTree {
    pub(crate) arena: Arena,
    pub(crate) config: TreeConfig,
    /// Most recent leaf of the current insertion, head of the suffix link chain
    active_leaf: NodeId,
    last_id: KeyId,
    key_count: u64,
    /// Deferred mode: identifiers have been attached but not aggregated yet
    pub(crate) pending: bool,
}

/// Per-key insertion state
struct Step<'k> {
    key: &'k str,
    id: KeyId,
    /// Byte offset of the longest suffix that has no explicit endpoint yet
    suffix_start: usize,
}

impl Step<'_> {
    /// Move on to the next shorter suffix
    fn advance(&mut self) {
        let width = self.key[self.suffix_start..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        self.suffix_start += width;
    }
}

/// How an existing edge relates to the rest of the key being inserted
enum LabelRelation {
    /// The label is exactly the rest of the key
    Equal,
    /// The rest of the key continues past the end of the label
    Covers,
    /// The rest of the key ends inside the label
    EndsInside,
    /// They diverge after a shared prefix
    Diverges,
}

impl GeneralizedSuffixTree {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            arena: Arena::new(),
            config,
            active_leaf: ROOT,
            last_id: 0,
            key_count: 0,
            pending: false,
        }
    }

    /// Add `key` to the index under `id`
    ///
    /// After `insert(K, id)`, `search(S)` contains `id` for every non-empty
    /// substring `S` of `K`. Identifiers must be non-decreasing across calls;
    /// a smaller one is rejected before the tree is touched.
    pub fn insert(&mut self, key: &str, id: KeyId) -> Result<()> {
        if id < self.last_id {
            return Err(Error::OutOfOrderInsertion {
                id,
                last: self.last_id,
            });
        }
        self.last_id = id;
        self.key_count += 1;
        self.active_leaf = ROOT;

        let mut step = Step {
            key,
            id,
            suffix_start: 0,
        };
        let mut node = ROOT;
        let mut text = String::new();

        for (pos, ch) in key.char_indices() {
            text.push(ch);
            let (next, rest) = self.update(&mut step, node, text, pos);
            let (next, rest) = self.canonize(next, &rest);
            node = next;
            text = rest.to_owned();
        }

        let canonical = self.attach_implicit_suffixes(&step);

        let leaf = self.active_leaf;
        if leaf != ROOT && leaf != canonical && self.arena.node(leaf).suffix_link.is_none() {
            self.arena.node_mut(leaf).suffix_link = Some(canonical);
        }

        Ok(())
    }

    /// Extend the tree with the last character of `text`, which is relative to
    /// `node`. Returns the reference pair of the active suffix afterwards.
    fn update(
        &mut self,
        step: &mut Step<'_>,
        mut node: NodeId,
        mut text: String,
        pos: usize,
    ) -> (NodeId, String) {
        let key = step.key;
        let rest = &key[pos..];
        let new_char = text
            .chars()
            .next_back()
            .expect("update extends a non-empty text");

        let mut prev_branch = ROOT;
        let (mut end_point, mut branch) =
            self.test_and_split(node, without_last(&text), new_char, rest, step.id);

        while !end_point {
            let leaf = match self.arena.child(branch, new_char) {
                // Generalized case: an earlier key already built this branch
                Some(edge) => edge.dest,
                None => {
                    let leaf = self.arena.push_node(Some(branch));
                    let edge = self.arena.push_edge(rest.to_owned(), leaf);
                    self.arena.node_mut(branch).edges.put(new_char, edge);
                    leaf
                }
            };
            self.add_identifier(leaf, step.id);

            if self.active_leaf != ROOT {
                self.arena.node_mut(self.active_leaf).suffix_link = Some(leaf);
            }
            self.active_leaf = leaf;

            if prev_branch != ROOT {
                self.arena.node_mut(prev_branch).suffix_link = Some(branch);
            }
            prev_branch = branch;

            step.advance();
            if node == ROOT {
                text.remove(0);
            } else {
                let link = self
                    .arena
                    .node(node)
                    .suffix_link
                    .expect("active node below the root must have a suffix link");
                let (next, remainder) = self.canonize(link, without_last(&text));
                let mut next_text = remainder.to_owned();
                next_text.push(new_char);
                node = next;
                text = next_text;
            }

            (end_point, branch) =
                self.test_and_split(node, without_last(&text), new_char, rest, step.id);
        }

        if prev_branch != ROOT {
            self.arena.node_mut(prev_branch).suffix_link = Some(branch);
        }

        (node, text)
    }

    /// Decide whether `part + t` is already present below `node`, splitting
    /// an edge when it is not. Returns whether an end point was reached and
    /// the node from which a new leaf may hang.
    fn test_and_split(
        &mut self,
        node: NodeId,
        part: &str,
        t: char,
        rest: &str,
        id: KeyId,
    ) -> (bool, NodeId) {
        let (node, remainder) = self.canonize(node, part);

        if let Some(first) = remainder.chars().next() {
            let edge = self
                .arena
                .node(node)
                .edges
                .get(first)
                .expect("canonical remainder continues along an edge");
            let label = self.arena.edge(edge).label.as_str();
            let tail = label
                .strip_prefix(remainder)
                .expect("edge label extends the canonical remainder");
            if tail.starts_with(t) {
                return (true, node);
            }
            let at = remainder.len();
            return (false, self.split_edge(node, edge, at));
        }

        let Some(edge) = self.arena.node(node).edges.get(t) else {
            return (false, node);
        };

        let label = self.arena.edge(edge).label.as_str();
        let relation = if rest == label {
            LabelRelation::Equal
        } else if rest.starts_with(label) {
            LabelRelation::Covers
        } else if label.starts_with(rest) {
            LabelRelation::EndsInside
        } else {
            LabelRelation::Diverges
        };

        match relation {
            LabelRelation::Equal => {
                let dest = self.arena.edge(edge).dest;
                self.add_identifier(dest, id);
                (true, node)
            }
            LabelRelation::EndsInside => {
                let mid = self.split_edge(node, edge, rest.len());
                self.add_identifier(mid, id);
                (false, node)
            }
            LabelRelation::Covers | LabelRelation::Diverges => (true, node),
        }
    }

    /// Descend from `node` through every edge whose full label prefixes
    /// `input`. Returns the deepest node reached and the unmatched rest.
    pub(crate) fn canonize<'a>(&self, mut node: NodeId, mut input: &'a str) -> (NodeId, &'a str) {
        while let Some(first) = input.chars().next() {
            let Some(edge) = self.arena.child(node, first) else {
                break;
            };
            match input.strip_prefix(edge.label.as_str()) {
                Some(rest) => {
                    input = rest;
                    node = edge.dest;
                }
                None => break,
            }
        }
        (node, input)
    }

    /// Split `edge` (leaving `from`) after `at` bytes of its label. The new
    /// intermediate node inherits the identifiers of the old destination.
    fn split_edge(&mut self, from: NodeId, edge: EdgeId, at: usize) -> NodeId {
        let (head, dest) = {
            let e = self.arena.edge_mut(edge);
            assert!(
                at > 0 && at < e.label.len(),
                "split point {at} must fall strictly inside label {:?}",
                e.label
            );
            let tail = e.label.split_off(at);
            (std::mem::replace(&mut e.label, tail), e.dest)
        };
        let head_char = head.chars().next().expect("split head is non-empty");
        let tail_char = self.arena.edge(edge).first_char();
        trace!("split {:?}|{:?} below node {}", head, self.arena.edge(edge).label, from);

        let mid = self.arena.push_node(Some(from));
        let inherited = self.arena.node(dest).ids.clone();
        self.arena.node_mut(mid).ids = inherited;
        self.arena.node_mut(dest).parent = Some(mid);

        let upper = self.arena.push_edge(head, mid);
        self.arena.node_mut(mid).edges.put(tail_char, edge);
        self.arena.node_mut(from).edges.put(head_char, upper);
        mid
    }

    /// Give every suffix from `step.suffix_start` on an explicit endpoint
    /// carrying the key's id, and chain their suffix links. Returns the
    /// endpoint of the longest such suffix, or the root if there is none.
    fn attach_implicit_suffixes(&mut self, step: &Step<'_>) -> NodeId {
        let key = step.key;
        let mut first = None;
        let mut prev: Option<NodeId> = None;

        for (offset, _) in key[step.suffix_start..].char_indices() {
            let suffix = &key[step.suffix_start + offset..];
            let endpoint = self.suffix_endpoint(suffix);
            self.add_identifier(endpoint, step.id);

            if let Some(prev) = prev {
                self.link_if_unset(prev, endpoint);
            }
            first.get_or_insert(endpoint);
            prev = Some(endpoint);
        }

        if let Some(last) = prev {
            self.link_if_unset(last, ROOT);
        }
        first.unwrap_or(ROOT)
    }

    /// Explicit node spelling exactly `suffix`, splitting the edge it ends in
    fn suffix_endpoint(&mut self, suffix: &str) -> NodeId {
        let (node, remainder) = self.canonize(ROOT, suffix);
        let Some(first) = remainder.chars().next() else {
            return node;
        };
        let edge = self
            .arena
            .node(node)
            .edges
            .get(first)
            .expect("every suffix of an inserted key is in the tree");
        assert!(
            self.arena.edge(edge).label.starts_with(remainder),
            "suffix {suffix:?} must end inside the edge it reaches"
        );
        self.split_edge(node, edge, remainder.len())
    }

    fn link_if_unset(&mut self, node: NodeId, target: NodeId) {
        if node == target {
            return;
        }
        let node = self.arena.node_mut(node);
        if node.suffix_link.is_none() {
            node.suffix_link = Some(target);
        }
    }

    /// Identifiers of every key containing `word`, or `None` if no key does
    ///
    /// In deferred mode the result is only complete after [`finalize`](Self::finalize).
    pub fn search(&self, word: &str) -> Option<&RoaringBitmap> {
        super::query::search(&self.arena, word)
    }

    /// Longest prefix of `word` spelled by a path from the root
    pub fn match_prefix<'w>(&self, word: &'w str) -> &'w str {
        super::query::match_prefix(&self.arena, word)
    }

    /// Longest substring of `text` that occurs in some key
    pub fn longest_substring<'w>(&self, text: &'w str) -> &'w str {
        super::query::longest_substring(&self.arena, text)
    }

    /// Seal the tree for the query phase
    pub fn freeze(mut self) -> SuffixIndex {
        self.finalize();
        let meta = self.meta();
        SuffixIndex::from_parts(self.arena, meta)
    }

    /// Metadata describing the current state of the tree
    pub fn meta(&self) -> IndexMeta {
        IndexMeta {
            version: FORMAT_VERSION,
            node_count: self.arena.node_count() as u32,
            edge_count: self.arena.edge_count() as u32,
            key_count: self.key_count,
            last_id: self.last_id,
            propagation: self.config.propagation,
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    pub fn stats(&self) -> TreeStats {
        super::stats::compute(&self.arena)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn root(&self) -> &Node {
        self.arena.root()
    }

    pub fn config(&self) -> TreeConfig {
        self.config
    }

    pub fn propagation(&self) -> Propagation {
        self.config.propagation
    }

    /// Highest identifier inserted so far
    pub fn last_id(&self) -> KeyId {
        self.last_id
    }

    /// Number of successful insertions
    pub fn key_count(&self) -> u64 {
        self.key_count
    }
}

impl Default for GeneralizedSuffixTree {
    fn default() -> Self {
        Self::new()
    }
}

/// `s` without its last character
fn without_last(s: &str) -> &str {
    match s.char_indices().next_back() {
        Some((idx, _)) => &s[..idx],
        None => "",
    }
}
