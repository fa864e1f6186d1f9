#![allow(dead_code)]

use gsti::index::GeneralizedSuffixTree;

/// Point-of-interest names in the normalized form the loader produces
pub const POI_KEYS: [&str; 28] = [
    "libertypike",
    "franklintn",
    "carothersjohnhenryhouse",
    "carothersezealhouse",
    "acrossthetauntonriverfromdightonindightonrockstatepark",
    "dightonma",
    "dightonrock",
    "6mineoflowgaponlowgapfork",
    "lowgapky",
    "lemasterjohnjandellenhouse",
    "lemasterhouse",
    "70wilburblvd",
    "poughkeepsieny",
    "freerhouse",
    "701laurelst",
    "conwaysc",
    "hollidayjwjrhouse",
    "mainandappletonsts",
    "menomoneefallswi",
    "mainstreethistoricdistrict",
    "addressrestricted",
    "brownsmillsnj",
    "hanoverfurnace",
    "hanoverbogironfurnace",
    "sofsavannahatfergusonaveandbethesdard",
    "savannahga",
    "bethesdahomeforboys",
    "bethesda",
];

/// Every non-empty substring of `word`, on character boundaries
pub fn substrings(word: &str) -> Vec<&str> {
    let bounds: Vec<usize> = word
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(word.len()))
        .collect();
    let mut out = Vec::new();
    for (a, &start) in bounds.iter().enumerate() {
        for &end in &bounds[a + 1..] {
            out.push(&word[start..end]);
        }
    }
    out
}

/// Tree with `words[i]` inserted under id `i`
pub fn build(words: &[&str]) -> GeneralizedSuffixTree {
    let mut tree = GeneralizedSuffixTree::new();
    for (i, word) in words.iter().enumerate() {
        tree.insert(word, i as u32).unwrap();
    }
    tree
}

/// Ids of the words containing `needle`, computed by brute force
pub fn naive_search(words: &[&str], needle: &str) -> Option<Vec<u32>> {
    let ids: Vec<u32> = words
        .iter()
        .enumerate()
        .filter(|(_, w)| w.contains(needle))
        .map(|(i, _)| i as u32)
        .collect();
    (!ids.is_empty() && !needle.is_empty()).then_some(ids)
}
