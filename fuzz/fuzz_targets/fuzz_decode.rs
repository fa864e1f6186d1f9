#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: (Vec<u8>, Vec<u8>)| {
    // Arbitrary bytes must decode or fail cleanly, never panic or hang
    let (edges, nodes) = data;
    let path = Path::new("fuzz");
    if let Ok(edges) = gsti::index::reader::decode_edges(&edges, path) {
        if let Ok(arena) = gsti::index::reader::decode_nodes(&nodes, path, edges) {
            let _ = gsti::index::query::search(&arena, "ab");
            let _ = gsti::index::query::longest_substring(&arena, "abcabc");
            let _ = arena.collect_subtree(0);
        }
    }
});
