//! Save/open round trips through the file system.

mod common;

use common::{POI_KEYS, build, substrings};
use gsti::index::{SuffixIndex, TreeWriter, edges_path, meta_path, nodes_path};
use std::fs;

#[test]
fn test_poi_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("poi");
    let index = build(&POI_KEYS).freeze();
    index.save(&base).unwrap();

    let loaded = SuffixIndex::open(&base).unwrap();
    assert_eq!(loaded, index);
    assert_eq!(loaded.arena().node_count(), index.arena().node_count());
    assert_eq!(loaded.arena().edge_count(), index.arena().edge_count());
    for word in POI_KEYS {
        for s in substrings(word) {
            assert_eq!(loaded.search(s), index.search(s), "{s:?}");
        }
        assert_eq!(loaded.match_prefix(word), word);
    }
    assert_eq!(loaded.stats(), index.stats());
}

#[test]
fn test_empty_tree_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("empty");
    let index = build(&[]).freeze();
    index.save(&base).unwrap();

    let loaded = SuffixIndex::open(&base).unwrap();
    assert_eq!(loaded, index);
    assert_eq!(loaded.arena().node_count(), 1);
    assert!(loaded.search("a").is_none());
}

#[test]
fn test_resave_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    let index = build(&["北京五道口", "五道口城铁站", "cacao"]).freeze();
    index.save(&first).unwrap();
    let loaded = SuffixIndex::open(&first).unwrap();
    TreeWriter::write(&second, loaded.arena(), None).unwrap();

    assert_eq!(fs::read(edges_path(&first)).unwrap(), fs::read(edges_path(&second)).unwrap());
    assert_eq!(fs::read(nodes_path(&first)).unwrap(), fs::read(nodes_path(&second)).unwrap());
    assert!(!meta_path(&second).exists());
}

#[test]
fn test_corrupted_node_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("poi");
    build(&POI_KEYS).freeze().save(&base).unwrap();

    let path = nodes_path(&base);
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    fs::write(&path, bytes).unwrap();

    let err = SuffixIndex::open(&base).unwrap_err();
    assert!(err.is_malformed(), "{err}");
}

#[test]
fn test_garbage_sidecar_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("poi");
    build(&POI_KEYS).freeze().save(&base).unwrap();
    fs::write(meta_path(&base), "{ not json").unwrap();

    assert!(SuffixIndex::open(&base).unwrap_err().is_malformed());
}
