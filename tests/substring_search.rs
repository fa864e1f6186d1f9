//! End-to-end substring and prefix queries over the public API.

mod common;

use common::{POI_KEYS, build, naive_search, substrings};
use gsti::index::{GeneralizedSuffixTree, TreeConfig};
use std::thread;

fn ids(tree: &GeneralizedSuffixTree, word: &str) -> Option<Vec<u32>> {
    tree.search(word).map(|b| b.iter().collect())
}

#[test]
fn test_cacao() {
    let tree = build(&["cacao"]);
    assert_eq!(ids(&tree, "aca"), Some(vec![0]));
    assert_eq!(ids(&tree, "caco"), None);
    assert_eq!(ids(&tree, "cacaoo"), None);
}

#[test]
fn test_banana_bano_ba() {
    let tree = build(&["banana", "bano", "ba"]);
    assert_eq!(ids(&tree, "ban"), Some(vec![0, 1]));
    assert_eq!(ids(&tree, "ba"), Some(vec![0, 1, 2]));
}

#[test]
fn test_same_key_twice() {
    let tree = build(&["cacao", "cacao"]);
    assert_eq!(ids(&tree, "ca"), Some(vec![0, 1]));
}

#[test]
fn test_booking_matches_book() {
    let tree = build(&["bookkeeper"]);
    assert_eq!(tree.match_prefix("booking"), "book");
}

#[test]
fn test_poi_keys_after_each_insertion() {
    let mut tree = GeneralizedSuffixTree::new();
    for (i, word) in POI_KEYS.iter().enumerate() {
        tree.insert(word, i as u32).unwrap();
        for s in substrings(word) {
            let found = tree.search(s).unwrap_or_else(|| panic!("{s:?} after {word:?}"));
            assert!(found.contains(i as u32), "{s:?} after {word:?}");
        }
    }
}

#[test]
fn test_poi_results_are_exact() {
    let tree = build(&POI_KEYS);
    for word in POI_KEYS {
        for s in substrings(word) {
            assert_eq!(ids(&tree, s), naive_search(&POI_KEYS, s), "{s:?}");
        }
    }
    for absent in ["zz", "houses", "bethesdaa", "qx", "furnaceh"] {
        assert_eq!(ids(&tree, absent), None, "{absent:?}");
    }
}

#[test]
fn test_full_keys_match_themselves() {
    let tree = build(&POI_KEYS);
    for word in POI_KEYS {
        assert_eq!(tree.match_prefix(word), word);
    }
    assert_eq!(tree.match_prefix("bethesdaxyz"), "bethesda");
}

#[test]
fn test_deferred_build_matches_eager() {
    let eager = build(&POI_KEYS);
    let mut deferred = GeneralizedSuffixTree::with_config(TreeConfig::deferred());
    for (i, word) in POI_KEYS.iter().enumerate() {
        deferred.insert(word, i as u32).unwrap();
    }
    let deferred = deferred.freeze();
    let eager = eager.freeze();

    assert_eq!(eager, deferred);
    for word in POI_KEYS {
        for s in substrings(word) {
            assert_eq!(eager.search(s), deferred.search(s), "{s:?}");
        }
    }
}

#[test]
fn test_propagated_sets_equal_subtree_walk() {
    let tree = build(&POI_KEYS);
    for word in POI_KEYS {
        for s in substrings(word) {
            assert_eq!(tree.search(s).cloned(), tree.search_exhaustive(s), "{s:?}");
        }
    }
}

#[test]
fn test_longest_substring() {
    let index = build(&POI_KEYS).freeze();
    assert_eq!(index.longest_substring("visit savannah georgia"), "savannah");
    assert_eq!(index.longest_substring("old furnaces"), "furnace");
    assert_eq!(index.longest_substring("!!!"), "");
}

#[test]
fn test_frozen_index_is_shared_across_threads() {
    let index = build(&POI_KEYS).freeze();
    thread::scope(|scope| {
        for chunk in POI_KEYS.chunks(7) {
            let index = &index;
            scope.spawn(move || {
                for word in chunk {
                    let expected = naive_search(&POI_KEYS, word);
                    let found: Option<Vec<u32>> = index.search(word).map(|b| b.iter().collect());
                    assert_eq!(found, expected);
                }
            });
        }
    });
}
