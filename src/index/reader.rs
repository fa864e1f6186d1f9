//! Query-phase index and the binary decoder
//!
//! Decoding reads each file fully into memory and validates every count,
//! index and label before any part of the arena is handed out.

use super::arena::{Arena, Edge, Node};
use super::edge_map::EdgeMap;
use super::query;
use super::types::{
    EDGES_MAGIC, FORMAT_VERSION, IndexMeta, NODES_MAGIC, NodeId, Propagation, ROOT, TreeStats,
    edges_path, meta_path, nodes_path,
};
use super::writer::TreeWriter;
use crate::error::{Error, Result};
use crate::utils::ByteReader;
use log::{debug, info};
use roaring::RoaringBitmap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

/// Immutable, shareable suffix index
///
/// Produced by [`GeneralizedSuffixTree::freeze`](super::GeneralizedSuffixTree::freeze)
/// or loaded with [`SuffixIndex::open`]. Suffix links are not persisted, so a
/// loaded index answers queries but cannot take further insertions.
#[derive(Debug, Clone)]
pub struct SuffixIndex {
    arena: Arena,
    meta: IndexMeta,
}

impl SuffixIndex {
    pub(crate) fn from_parts(arena: Arena, meta: IndexMeta) -> Self {
        Self { arena, meta }
    }

    /// Load `<base>.edges.bin` and `<base>.nodes.bin`, plus the metadata
    /// sidecar when it exists
    pub fn open(base: &Path) -> Result<Self> {
        let start = Instant::now();

        let path = edges_path(base);
        let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        let edges = decode_edges(&bytes, &path)?;

        let path = nodes_path(base);
        let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        let arena = decode_nodes(&bytes, &path, edges)?;

        let meta = read_meta(base, &arena)?;
        info!(
            "loaded {} nodes and {} edges from {} in {:?}",
            arena.node_count(),
            arena.edge_count(),
            base.display(),
            start.elapsed()
        );
        Ok(Self { arena, meta })
    }

    /// Persist to the `<base>.*` file family
    pub fn save(&self, base: &Path) -> Result<()> {
        TreeWriter::write(base, &self.arena, Some(&self.meta))
    }

    /// Identifiers of every key containing `word`, or `None` if no key does
    pub fn search(&self, word: &str) -> Option<&RoaringBitmap> {
        query::search(&self.arena, word)
    }

    /// Longest prefix of `word` spelled by a path from the root
    pub fn match_prefix<'w>(&self, word: &'w str) -> &'w str {
        query::match_prefix(&self.arena, word)
    }

    /// Longest substring of `text` that occurs in some key
    pub fn longest_substring<'w>(&self, text: &'w str) -> &'w str {
        query::longest_substring(&self.arena, text)
    }

    /// Union of all identifiers below the node `word` leads to
    pub fn search_exhaustive(&self, word: &str) -> Option<RoaringBitmap> {
        let node = query::locate(&self.arena, word)?;
        Some(self.arena.collect_subtree(node))
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn stats(&self) -> TreeStats {
        super::stats::compute(&self.arena)
    }
}

/// Two indexes are equal when their arenas are; metadata such as the build
/// time is ignored.
impl PartialEq for SuffixIndex {
    fn eq(&self, other: &Self) -> bool {
        self.arena == other.arena
    }
}

impl Eq for SuffixIndex {}

fn read_meta(base: &Path, arena: &Arena) -> Result<IndexMeta> {
    let path = meta_path(base);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no metadata at {}, deriving it from the root", path.display());
            return Ok(derived_meta(arena));
        }
        Err(e) => return Err(Error::io(&path, e)),
    };

    let meta: IndexMeta =
        serde_json::from_str(&text).map_err(|e| Error::malformed(&path, e.to_string()))?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::malformed(
            &path,
            format!("unsupported version {}", meta.version),
        ));
    }
    if meta.node_count as usize != arena.node_count()
        || meta.edge_count as usize != arena.edge_count()
    {
        return Err(Error::malformed(
            &path,
            format!(
                "metadata lists {} nodes and {} edges, files hold {} and {}",
                meta.node_count,
                meta.edge_count,
                arena.node_count(),
                arena.edge_count()
            ),
        ));
    }
    Ok(meta)
}

/// Metadata for an index saved without a sidecar. Repeated inserts of one
/// id are indistinguishable from the id set alone, so `key_count` becomes
/// the number of distinct ids.
fn derived_meta(arena: &Arena) -> IndexMeta {
    let ids = arena.root().ids();
    IndexMeta {
        version: FORMAT_VERSION,
        node_count: arena.node_count() as u32,
        edge_count: arena.edge_count() as u32,
        key_count: ids.len(),
        last_id: ids.max().unwrap_or(0),
        propagation: Propagation::Eager,
        created_at: 0,
    }
}

fn read_header(cursor: &mut ByteReader<'_>, magic: u32) -> std::result::Result<(), String> {
    let found = cursor.read_u32_le()?;
    if found != magic {
        return Err(format!(
            "bad magic {:?}, expected {:?}",
            String::from_utf8_lossy(&found.to_le_bytes()),
            String::from_utf8_lossy(&magic.to_le_bytes())
        ));
    }
    let version = cursor.read_u32_le()?;
    if version != FORMAT_VERSION {
        return Err(format!("unsupported version {version}"));
    }
    Ok(())
}

/// Decode an edge file. Destinations are checked later against the node count.
pub fn decode_edges(bytes: &[u8], path: &Path) -> Result<Vec<Edge>> {
    parse_edges(bytes).map_err(|reason| Error::malformed(path, reason))
}

fn parse_edges(bytes: &[u8]) -> std::result::Result<Vec<Edge>, String> {
    let mut cursor = ByteReader::new(bytes);
    read_header(&mut cursor, EDGES_MAGIC)?;

    // length + at least one label byte + destination
    let count = cursor.read_count(9)?;
    let mut edges = Vec::with_capacity(count);
    for index in 0..count {
        let at = cursor.position();
        let len = cursor.read_u32_le()? as usize;
        if len == 0 {
            return Err(format!("edge {index} at offset {at} has an empty label"));
        }
        let raw = cursor.read_bytes(len)?;
        let label = std::str::from_utf8(raw)
            .map_err(|e| format!("edge {index} label is not UTF-8: {e}"))?;
        let dest = cursor.read_u32_le()?;
        edges.push(Edge::new(label.to_owned(), dest));
    }

    if !cursor.is_empty() {
        return Err(format!(
            "{} trailing bytes at offset {}",
            cursor.remaining(),
            cursor.position()
        ));
    }
    Ok(edges)
}

/// Decode a node file and join it with already decoded edges
pub fn decode_nodes(bytes: &[u8], path: &Path, edges: Vec<Edge>) -> Result<Arena> {
    parse_nodes(bytes, edges).map_err(|reason| Error::malformed(path, reason))
}

fn parse_nodes(bytes: &[u8], edges: Vec<Edge>) -> std::result::Result<Arena, String> {
    let mut cursor = ByteReader::new(bytes);
    read_header(&mut cursor, NODES_MAGIC)?;

    // id count + map size
    let count = cursor.read_count(8)?;
    if count == 0 {
        return Err("node count is zero, expected at least the root".to_string());
    }
    for (index, edge) in edges.iter().enumerate() {
        if edge.dest() as usize >= count {
            return Err(format!(
                "edge {index} points to node {} of {count}",
                edge.dest()
            ));
        }
    }

    // every edge is claimed by exactly one map entry
    let mut claimed = vec![false; edges.len()];
    let mut nodes = Vec::with_capacity(count);
    for index in 0..count {
        let id_count = cursor.read_count(4)?;
        let mut ids = RoaringBitmap::new();
        let mut previous = None;
        for _ in 0..id_count {
            let id = cursor.read_u32_le()?;
            if previous.is_some_and(|p| p >= id) {
                return Err(format!("node {index} ids are not strictly ascending"));
            }
            previous = Some(id);
            ids.insert(id);
        }

        let map_size = cursor.read_count(8)?;
        let mut map = EdgeMap::new();
        for _ in 0..map_size {
            let raw = cursor.read_u32_le()?;
            let ch = char::from_u32(raw)
                .ok_or_else(|| format!("node {index} has invalid character {raw:#x}"))?;
            let edge = cursor.read_u32_le()?;
            let Some(target) = edges.get(edge as usize) else {
                return Err(format!(
                    "node {index} references edge {edge} of {}",
                    edges.len()
                ));
            };
            if target.first_char() != ch {
                return Err(format!(
                    "node {index} maps {ch:?} to edge {edge} labeled {:?}",
                    target.label()
                ));
            }
            if map.get(ch).is_some() {
                return Err(format!("node {index} maps {ch:?} twice"));
            }
            if std::mem::replace(&mut claimed[edge as usize], true) {
                return Err(format!("edge {edge} is referenced more than once"));
            }
            map.put(ch, edge);
        }

        nodes.push(Node {
            edges: map,
            suffix_link: None,
            parent: None,
            ids,
        });
    }

    if !cursor.is_empty() {
        return Err(format!(
            "{} trailing bytes at offset {}",
            cursor.remaining(),
            cursor.position()
        ));
    }
    if let Some(edge) = claimed.iter().position(|&c| !c) {
        return Err(format!("edge {edge} is not referenced by any node"));
    }

    link_parents(&mut nodes, &edges)?;
    Ok(Arena::from_parts(nodes, edges))
}

/// Record parents and require the edges to form a tree rooted at node 0
fn link_parents(nodes: &mut [Node], edges: &[Edge]) -> std::result::Result<(), String> {
    let mut seen = vec![false; nodes.len()];
    seen[ROOT as usize] = true;
    let mut stack: Vec<NodeId> = vec![ROOT];
    let mut visited = 1;
    while let Some(node) = stack.pop() {
        let children: Vec<NodeId> = nodes[node as usize]
            .edges
            .values()
            .map(|e| edges[e as usize].dest())
            .collect();
        for child in children {
            if std::mem::replace(&mut seen[child as usize], true) {
                return Err(format!("node {child} is reached more than once"));
            }
            nodes[child as usize].parent = Some(node);
            visited += 1;
            stack.push(child);
        }
    }
    if visited != nodes.len() {
        return Err(format!(
            "{} of {} nodes are unreachable from the root",
            nodes.len() - visited,
            nodes.len()
        ));
    }
    Ok(())
}
