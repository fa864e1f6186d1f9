//! Identifier propagation
//!
//! A node's identifier set holds every key that contains the node's string.
//! When a key id lands on a suffix endpoint it must also reach every node
//! spelling a substring of that endpoint: its tree ancestors (prefixes) and its
//! suffix-link chain (suffixes). Eager mode walks both relations right away,
//! stopping at nodes that already carry the id. Deferred mode only marks the
//! endpoint and leaves the ancestors to one bottom-up pass in `finalize`.

use super::arena::Arena;
use super::builder::GeneralizedSuffixTree;
use super::types::{KeyId, NodeId, Propagation, ROOT};
use log::debug;
use roaring::RoaringBitmap;

impl GeneralizedSuffixTree {
    /// Attach `id` to `node` according to the configured propagation mode
    pub(crate) fn add_identifier(&mut self, node: NodeId, id: KeyId) {
        match self.config.propagation {
            Propagation::Eager => self.arena.propagate(node, id),
            Propagation::Deferred => {
                self.arena.node_mut(node).ids.insert(id);
                self.pending = true;
            }
        }
    }

    /// Complete deferred propagation. A no-op in eager mode or when nothing
    /// was inserted since the last call.
    pub fn finalize(&mut self) {
        if !self.pending {
            return;
        }
        self.arena.aggregate();
        self.pending = false;
    }

    /// Whether `search` may currently miss identifiers
    pub fn needs_finalize(&self) -> bool {
        self.pending
    }

    /// Union of the identifiers in the whole subtree under the node `word`
    /// leads to. Slow; used to cross-check the propagated sets.
    pub fn search_exhaustive(&self, word: &str) -> Option<RoaringBitmap> {
        let node = super::query::locate(&self.arena, word)?;
        Some(self.arena.collect_subtree(node))
    }
}

impl Arena {
    /// Add `id` to `node` and to every node reachable through suffix links
    /// and parents, skipping anything that already holds it
    ///
    /// Stopping early is sound because a node holding `id` already has it on
    /// all nodes reachable from it.
    pub(crate) fn propagate(&mut self, node: NodeId, id: KeyId) {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            let node = self.node_mut(current);
            if !node.ids.insert(id) {
                continue;
            }
            pending.extend(node.suffix_link);
            pending.extend(node.parent);
        }
    }

    /// Union every node's identifiers into its ancestors, children first
    pub(crate) fn aggregate(&mut self) {
        let order = self.preorder();
        for &node in order.iter().rev() {
            let mut merged = RoaringBitmap::new();
            for edge in self.node(node).edges.values() {
                merged |= &self.node(self.edge(edge).dest).ids;
            }
            self.node_mut(node).ids |= merged;
        }
        debug!("aggregated identifiers over {} nodes", order.len());
    }

    /// Identifiers stored anywhere in the subtree rooted at `node`
    pub fn collect_subtree(&self, node: NodeId) -> RoaringBitmap {
        let mut ids = RoaringBitmap::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            ids |= &node.ids;
            stack.extend(node.edges.values().map(|e| self.edge(e).dest));
        }
        ids
    }

    /// Nodes reachable from the root, parents before children
    fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_count());
        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.node(node).edges.values().map(|e| self.edge(e).dest));
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::TreeConfig;

    #[test]
    fn test_propagate_follows_links_and_parents() {
        let mut arena = Arena::new();
        let a = arena.push_node(Some(ROOT));
        let b = arena.push_node(Some(a));
        let c = arena.push_node(Some(ROOT));
        arena.node_mut(b).suffix_link = Some(c);

        arena.propagate(b, 4);
        for node in [ROOT, a, b, c] {
            assert!(arena.node(node).contains_id(4), "node {node}");
        }
    }

    #[test]
    fn test_propagate_stops_at_marked_nodes() {
        let mut arena = Arena::new();
        let a = arena.push_node(Some(ROOT));
        let b = arena.push_node(Some(ROOT));
        arena.node_mut(a).suffix_link = Some(b);
        arena.node_mut(b).ids.insert(1);

        arena.propagate(a, 1);
        assert!(arena.node(a).contains_id(1));
        // b already held the id, so the walk ended there
        assert!(arena.node(ROOT).contains_id(1));
        assert!(!arena.node(ROOT).ids().contains(2));
    }

    #[test]
    fn test_eager_sets_equal_subtree_union() {
        let words = [
            "carothersjohnhenryhouse",
            "carothersezealhouse",
            "freerhouse",
            "lemasterhouse",
        ];
        let mut tree = GeneralizedSuffixTree::new();
        for (i, word) in words.iter().enumerate() {
            tree.insert(word, i as KeyId).unwrap();
        }

        for word in words {
            for start in 0..word.len() {
                for end in start + 1..=word.len() {
                    let s = &word[start..end];
                    assert_eq!(tree.search(s).cloned(), tree.search_exhaustive(s), "{s:?}");
                }
            }
        }
        assert_eq!(tree.search_exhaustive("zzz"), None);
    }

    #[test]
    fn test_deferred_needs_finalize() {
        let mut tree = GeneralizedSuffixTree::with_config(TreeConfig::deferred());
        assert!(!tree.needs_finalize());
        tree.insert("banana", 0).unwrap();
        tree.insert("bano", 1).unwrap();
        assert!(tree.needs_finalize());

        tree.finalize();
        assert!(!tree.needs_finalize());
        let ban: Vec<u32> = tree.search("ban").unwrap().iter().collect();
        assert_eq!(ban, vec![0, 1]);
        assert_eq!(tree.root().ids().len(), 2);
    }
}
