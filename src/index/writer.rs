//! Binary serialization of a tree
//!
//! Layout of `<base>.edges.bin` (all integers u32 little-endian):
//!
//! ```text
//! magic "GSTE" | version | edge count | { label length | label bytes | dest }*
//! ```
//!
//! Layout of `<base>.nodes.bin`:
//!
//! ```text
//! magic "GSTN" | version | node count |
//!     { id count | ids ascending | map size | { char | edge index }* }*
//! ```

use super::arena::Arena;
use super::types::{
    EDGES_MAGIC, FORMAT_VERSION, IndexMeta, NODES_MAGIC, edges_path, meta_path, nodes_path,
};
use crate::error::{Error, Result};
use crate::utils::{write_len_le, write_u32_le};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Writes an arena to the `<base>.*` file family
pub struct TreeWriter;

impl TreeWriter {
    /// Write edges, nodes and (when given) the metadata sidecar
    pub fn write(base: &Path, arena: &Arena, meta: Option<&IndexMeta>) -> Result<()> {
        let start = Instant::now();

        let path = edges_path(base);
        write_file(&path, |w| write_edges(w, arena))?;

        let path = nodes_path(base);
        write_file(&path, |w| write_nodes(w, arena))?;

        if let Some(meta) = meta {
            let path = meta_path(base);
            write_file(&path, |w| {
                serde_json::to_writer_pretty(&mut *w, meta)?;
                writeln!(w)
            })?;
        }

        info!(
            "wrote {} nodes and {} edges to {} in {:?}",
            arena.node_count(),
            arena.edge_count(),
            base.display(),
            start.elapsed()
        );
        Ok(())
    }
}

fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let run = || -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        body(&mut writer)?;
        writer.flush()
    };
    run().map_err(|e| Error::io(path, e))
}

/// Encode every edge in arena order
pub fn write_edges<W: Write>(writer: &mut W, arena: &Arena) -> io::Result<()> {
    write_u32_le(writer, EDGES_MAGIC)?;
    write_u32_le(writer, FORMAT_VERSION)?;
    write_len_le(writer, arena.edge_count())?;
    for edge in arena.edges() {
        let label = edge.label().as_bytes();
        write_len_le(writer, label.len())?;
        writer.write_all(label)?;
        write_u32_le(writer, edge.dest())?;
    }
    Ok(())
}

/// Encode every node in arena order
pub fn write_nodes<W: Write>(writer: &mut W, arena: &Arena) -> io::Result<()> {
    write_u32_le(writer, NODES_MAGIC)?;
    write_u32_le(writer, FORMAT_VERSION)?;
    write_len_le(writer, arena.node_count())?;
    for node in arena.nodes() {
        write_len_le(writer, node.ids().len() as usize)?;
        for id in node.ids() {
            write_u32_le(writer, id)?;
        }
        write_len_le(writer, node.edges().len())?;
        for (ch, edge) in node.edges().iter() {
            write_u32_le(writer, ch as u32)?;
            write_u32_le(writer, edge)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::GeneralizedSuffixTree;

    fn words(bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_single_key_layout() {
        let mut tree = GeneralizedSuffixTree::new();
        tree.insert("ab", 3).unwrap();

        let mut edges = Vec::new();
        write_edges(&mut edges, tree.arena()).unwrap();
        assert_eq!(&edges[..4], b"GSTE");
        // header, count, then "ab" -> 1 and "b" -> 2
        assert_eq!(edges.len(), 4 * 3 + (4 + 2 + 4) + (4 + 1 + 4));
        assert_eq!(words(&edges[4..16]), vec![1, 2, 2]);
        assert_eq!(&edges[16..18], b"ab");

        let mut nodes = Vec::new();
        write_nodes(&mut nodes, tree.arena()).unwrap();
        assert_eq!(&nodes[..4], b"GSTN");
        assert_eq!(
            words(&nodes[4..]),
            vec![
                1, 3, // version, node count
                1, 3, 2, 'a' as u32, 0, 'b' as u32, 1, // root
                1, 3, 0, // leaf "ab"
                1, 3, 0, // leaf "b"
            ]
        );
    }

    #[test]
    fn test_write_creates_file_family() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("dict");
        let mut tree = GeneralizedSuffixTree::new();
        tree.insert("cacao", 0).unwrap();

        TreeWriter::write(&base, tree.arena(), Some(&tree.meta())).unwrap();
        assert!(edges_path(&base).is_file());
        assert!(nodes_path(&base).is_file());
        let meta: IndexMeta =
            serde_json::from_str(&std::fs::read_to_string(meta_path(&base)).unwrap()).unwrap();
        assert_eq!(meta.key_count, 1);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("missing").join("dict");
        let err = TreeWriter::write(&base, &Arena::new(), None).unwrap_err();
        assert!(matches!(err, crate::Error::Io { .. }));
    }
}
