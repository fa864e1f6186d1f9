#![no_main]

use gsti::index::{GeneralizedSuffixTree, TreeConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Vec<String>, bool)| {
    let (keys, deferred) = input;
    let config = if deferred { TreeConfig::deferred() } else { TreeConfig::default() };
    let mut tree = GeneralizedSuffixTree::with_config(config);
    for (i, key) in keys.iter().enumerate() {
        tree.insert(key, i as u32).unwrap();
    }
    let index = tree.freeze();

    // every key is found under its own id and fully matched
    for (i, key) in keys.iter().enumerate() {
        if key.is_empty() {
            continue;
        }
        assert!(index.search(key).is_some_and(|ids| ids.contains(i as u32)));
        assert_eq!(index.match_prefix(key), key.as_str());
    }
});
