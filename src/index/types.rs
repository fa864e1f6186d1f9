use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Index of a node in the arena
pub type NodeId = u32;

/// Index of an edge in the arena
pub type EdgeId = u32;

/// Identifier attached to an inserted key
pub type KeyId = u32;

/// The root is always the first node created
pub const ROOT: NodeId = 0;

/// Magic number for edge files ("GSTE")
pub const EDGES_MAGIC: u32 = u32::from_le_bytes(*b"GSTE");

/// Magic number for node files ("GSTN")
pub const NODES_MAGIC: u32 = u32::from_le_bytes(*b"GSTN");

/// Current version of the binary format
pub const FORMAT_VERSION: u32 = 1;

/// Suffix appended to the base path for the edge file
pub const EDGES_SUFFIX: &str = ".edges.bin";

/// Suffix appended to the base path for the node file
pub const NODES_SUFFIX: &str = ".nodes.bin";

/// Suffix appended to the base path for the metadata sidecar
pub const META_SUFFIX: &str = ".meta.json";

/// `<base>.edges.bin`
pub fn edges_path(base: &Path) -> PathBuf {
    with_suffix(base, EDGES_SUFFIX)
}

/// `<base>.nodes.bin`
pub fn nodes_path(base: &Path) -> PathBuf {
    with_suffix(base, NODES_SUFFIX)
}

/// `<base>.meta.json`
pub fn meta_path(base: &Path) -> PathBuf {
    with_suffix(base, META_SUFFIX)
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// How identifiers reach the nodes above a suffix endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Propagation {
    /// Every insertion updates all affected nodes immediately
    #[default]
    Eager,
    /// Insertions only mark suffix endpoints; a single bottom-up pass in
    /// `finalize` fills in the rest
    Deferred,
}

/// Configuration for tree construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TreeConfig {
    /// Identifier propagation strategy (default: eager)
    pub propagation: Propagation,
}

impl TreeConfig {
    /// Configuration for bulk loads that defer propagation until `finalize`
    pub fn deferred() -> Self {
        Self {
            propagation: Propagation::Deferred,
        }
    }
}

/// Index metadata stored in `<base>.meta.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Binary format version
    pub version: u32,
    /// Number of nodes in the arena
    pub node_count: u32,
    /// Number of edges in the arena
    pub edge_count: u32,
    /// Number of successful `insert` calls. An index opened without a
    /// sidecar only knows its distinct ids and reports their count here.
    pub key_count: u64,
    /// Highest identifier inserted
    pub last_id: KeyId,
    /// Propagation mode the tree was built with
    pub propagation: Propagation,
    /// Unix timestamp of the build
    pub created_at: u64,
}

/// Summary statistics about a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub nodes: usize,
    pub edges: usize,
    pub leaves: usize,
    /// Distinct identifiers reachable from the root
    pub keys: u64,
    /// Total size of all edge labels in bytes
    pub label_bytes: usize,
    /// Largest number of outgoing edges on a single node
    pub max_fanout: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_paths_append_suffix() {
        let base = Path::new("/tmp/data/poi.txt");
        assert_eq!(edges_path(base), PathBuf::from("/tmp/data/poi.txt.edges.bin"));
        assert_eq!(nodes_path(base), PathBuf::from("/tmp/data/poi.txt.nodes.bin"));
        assert_eq!(meta_path(base), PathBuf::from("/tmp/data/poi.txt.meta.json"));
    }

    #[test]
    fn test_magic_is_ascii_tag() {
        assert_eq!(EDGES_MAGIC.to_le_bytes(), *b"GSTE");
        assert_eq!(NODES_MAGIC.to_le_bytes(), *b"GSTN");
    }

    #[test]
    fn test_propagation_serde() {
        let json = serde_json::to_string(&TreeConfig::deferred()).unwrap();
        assert_eq!(json, r#"{"propagation":"deferred"}"#);
        let config: TreeConfig = serde_json::from_str(r#"{"propagation":"eager"}"#).unwrap();
        assert_eq!(config, TreeConfig::default());
    }
}
