//! Append-only storage for the nodes and edges of a tree
//!
//! All cross references are indices into the two vectors owned by the
//! [`Arena`]. Nodes and edges are never removed, so an index stays valid for
//! the lifetime of the arena. Suffix links and parent indices are navigational
//! only; ownership of every node rests with the arena.

use super::edge_map::EdgeMap;
use super::types::{EdgeId, KeyId, NodeId, ROOT};
use roaring::RoaringBitmap;

/// A vertex of the tree
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) edges: EdgeMap,
    /// Node spelling the same string without its first character
    pub(crate) suffix_link: Option<NodeId>,
    /// Node owning the edge that leads here (construction only)
    pub(crate) parent: Option<NodeId>,
    pub(crate) ids: RoaringBitmap,
}

impl Node {
    pub fn edges(&self) -> &EdgeMap {
        &self.edges
    }

    pub fn suffix_link(&self) -> Option<NodeId> {
        self.suffix_link
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Identifiers of the keys that contain this node's string
    pub fn ids(&self) -> &RoaringBitmap {
        &self.ids
    }

    pub fn contains_id(&self, id: KeyId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Suffix links and parents are rebuilt during construction and are not
/// persisted, so equality only covers what the binary format carries.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids && self.edges == other.edges
    }
}

impl Eq for Node {}

/// A labeled transition between two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub(crate) label: String,
    pub(crate) dest: NodeId,
}

impl Edge {
    pub fn new(label: String, dest: NodeId) -> Self {
        debug_assert!(!label.is_empty(), "edge labels are never empty");
        Self { label, dest }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn dest(&self) -> NodeId {
        self.dest
    }

    /// First character of the label
    pub fn first_char(&self) -> char {
        self.label
            .chars()
            .next()
            .expect("edge labels are never empty")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Arena {
    /// Create an arena holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            edges: Vec::new(),
        }
    }

    /// Assemble an arena from decoded parts; the caller has already validated
    /// every index
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        debug_assert!(!nodes.is_empty(), "an arena always has a root");
        Self { nodes, edges }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id as usize]
    }

    #[inline]
    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id as usize]
    }

    pub fn root(&self) -> &Node {
        self.node(ROOT)
    }

    /// Outgoing edge of `node` whose label starts with `ch`
    #[inline]
    pub fn child(&self, node: NodeId, ch: char) -> Option<&Edge> {
        self.node(node).edges.get(ch).map(|e| self.edge(e))
    }

    pub(crate) fn push_node(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::try_from(self.nodes.len()).expect("node arena exceeds u32 indices");
        self.nodes.push(Node {
            parent,
            ..Node::default()
        });
        id
    }

    pub(crate) fn push_edge(&mut self, label: String, dest: NodeId) -> EdgeId {
        let id = EdgeId::try_from(self.edges.len()).expect("edge arena exceeds u32 indices");
        self.edges.push(Edge::new(label, dest));
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
