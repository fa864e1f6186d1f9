//! Dictionary loading and verification
//!
//! A dictionary file holds one key per line. The id of a key is its
//! zero-based line number, so blank lines consume an id without inserting
//! anything and ids stay aligned with the file.

use crate::index::builder::GeneralizedSuffixTree;
use crate::index::reader::SuffixIndex;
use crate::index::types::{KeyId, Propagation, TreeConfig};
use crate::utils::normalize_key;
use crate::utils::progress::{key_bar, key_spinner};
use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Options for building an index from a dictionary
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Lowercase keys and keep only ASCII letters and digits
    pub normalize: bool,
    pub propagation: Propagation,
    /// Show a progress spinner on stderr
    pub progress: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            normalize: false,
            propagation: Propagation::Eager,
            progress: true,
        }
    }
}

/// The key stored for one dictionary line
pub fn prepare_key(line: &str, normalize: bool) -> Cow<'_, str> {
    let trimmed = line.trim();
    if normalize {
        Cow::Owned(normalize_key(trimmed))
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Id of the key on zero-based line `line_no`
fn line_id(line_no: usize) -> Result<KeyId> {
    KeyId::try_from(line_no)
        .with_context(|| format!("Line {} exceeds the 32-bit key id range", line_no + 1))
}

/// Build a tree from a line-oriented reader
pub fn build_from_reader<R: BufRead>(
    reader: R,
    options: &BuildOptions,
) -> Result<GeneralizedSuffixTree> {
    let start = Instant::now();
    let mut tree = GeneralizedSuffixTree::with_config(TreeConfig {
        propagation: options.propagation,
    });
    let spinner = key_spinner(options.progress, "Inserting keys...");

    let mut skipped = 0u64;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let id = line_id(line_no)?;
        let key = prepare_key(&line, options.normalize);
        if key.is_empty() {
            skipped += 1;
            continue;
        }
        tree.insert(&key, id)?;
        if let Some(ref pb) = spinner {
            pb.inc(1);
        }
    }

    if tree.needs_finalize() {
        if let Some(ref pb) = spinner {
            pb.set_message("Propagating identifiers...");
        }
        tree.finalize();
    }
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    info!(
        "inserted {} keys ({} blank lines skipped) into {} nodes in {:?}",
        tree.key_count(),
        skipped,
        tree.arena().node_count(),
        start.elapsed()
    );
    Ok(tree)
}

/// Build a tree from the dictionary at `path`
pub fn build_from_file(path: &Path, options: &BuildOptions) -> Result<GeneralizedSuffixTree> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    build_from_reader(BufReader::new(file), options)
        .with_context(|| format!("Failed to build index from {}", path.display()))
}

/// Read every line of a dictionary file
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// A dictionary key the index does not answer correctly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyFailure {
    pub id: KeyId,
    pub key: String,
    /// What `match_prefix` returned for the key
    pub matched: String,
    /// Whether `search` found the key's own id
    pub found_id: bool,
}

/// Outcome of [`verify_keys`]
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub checked: u64,
    pub failures: Vec<VerifyFailure>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Check that every key of `lines` is found under its own id and fully
/// matched, in parallel
pub fn verify_keys(
    index: &SuffixIndex,
    lines: &[String],
    options: &BuildOptions,
) -> Result<VerifyReport> {
    let bar = key_bar(options.progress, lines.len() as u64, "Verifying keys...");
    let checked = AtomicU64::new(0);

    let outcomes: Vec<Option<VerifyFailure>> = lines
        .par_iter()
        .enumerate()
        .map(|(line_no, line)| -> Result<Option<VerifyFailure>> {
            if let Some(ref pb) = bar {
                pb.inc(1);
            }
            let id = line_id(line_no)?;
            let key = prepare_key(line, options.normalize);
            if key.is_empty() {
                return Ok(None);
            }
            checked.fetch_add(1, Ordering::Relaxed);
            Ok(verify_key(index, id, key))
        })
        .collect::<Result<_>>()?;
    let mut failures: Vec<VerifyFailure> = outcomes.into_iter().flatten().collect();
    failures.sort_by_key(|f| f.id);

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }
    Ok(VerifyReport {
        checked: checked.into_inner(),
        failures,
    })
}

fn verify_key(index: &SuffixIndex, id: KeyId, key: Cow<'_, str>) -> Option<VerifyFailure> {
    let found_id = index.search(&key).is_some_and(|ids| ids.contains(id));
    let matched = index.match_prefix(&key);
    if found_id && matched.len() == key.len() {
        return None;
    }
    debug!("key {id} {key:?} failed: matched {matched:?}, id found: {found_id}");
    let matched = matched.to_owned();
    Some(VerifyFailure {
        id,
        key: key.into_owned(),
        matched,
        found_id,
    })
}
