//! Property tests against a brute-force substring scan.

mod common;

use common::naive_search;
use gsti::index::{GeneralizedSuffixTree, SuffixIndex, TreeConfig};
use proptest::prelude::*;

fn keys() -> impl Strategy<Value = Vec<String>> {
    // small alphabets force shared structure and repeated splits
    prop::collection::vec("[abc]{0,10}|[a-z]{1,6}|[αβ]{1,4}", 1..12)
}

fn build(words: &[&str], config: TreeConfig) -> GeneralizedSuffixTree {
    let mut tree = GeneralizedSuffixTree::with_config(config);
    for (i, word) in words.iter().enumerate() {
        tree.insert(word, i as u32).unwrap();
    }
    tree
}

/// Words that may or may not occur in the keys
fn needles() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[abcαβ]{1,5}", 0..20)
}

fn search(index: &SuffixIndex, word: &str) -> Option<Vec<u32>> {
    index.search(word).map(|b| b.iter().collect())
}

proptest! {
    #[test]
    fn search_matches_naive_scan(words in keys(), needles in needles()) {
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let index = build(&words, TreeConfig::default()).freeze();

        for word in &words {
            for start in word.char_indices().map(|(i, _)| i) {
                for end in word[start..].char_indices().map(|(i, c)| start + i + c.len_utf8()) {
                    let s = &word[start..end];
                    prop_assert_eq!(search(&index, s), naive_search(&words, s), "{:?}", s);
                }
            }
            prop_assert_eq!(index.match_prefix(word), *word);
        }
        for needle in &needles {
            prop_assert_eq!(search(&index, needle), naive_search(&words, needle), "{:?}", needle);
        }
    }

    #[test]
    fn deferred_equals_eager(words in keys()) {
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let eager = build(&words, TreeConfig::default()).freeze();
        let deferred = build(&words, TreeConfig::deferred()).freeze();
        prop_assert_eq!(eager.arena(), deferred.arena());
    }

    #[test]
    fn match_prefix_is_longest_indexed_prefix(words in keys(), needle in "[abc]{0,8}") {
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let index = build(&words, TreeConfig::default()).freeze();

        let matched = index.match_prefix(&needle);
        prop_assert!(needle.starts_with(matched));
        if !matched.is_empty() {
            prop_assert!(words.iter().any(|w| w.contains(matched)));
        }
        if matched.len() < needle.len() {
            let longer = &needle[..matched.len() + 1];
            prop_assert!(words.iter().all(|w| !w.contains(longer)));
        }
    }

    #[test]
    fn round_trip_preserves_structure(words in keys()) {
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let index = build(&words, TreeConfig::default()).freeze();
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("prop");
        index.save(&base).unwrap();
        prop_assert_eq!(SuffixIndex::open(&base).unwrap(), index);
    }
}
