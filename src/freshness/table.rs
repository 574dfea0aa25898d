//! Per-output hash table kept between builds in one process.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::ContentHash;

/// Output path (relative to the output directory) to last written hash.
pub type HashTable = FxHashMap<PathBuf, ContentHash>;

/// Outputs whose hash differs between two builds, or that are new, sorted.
pub fn changed_outputs(previous: &HashTable, current: &HashTable) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = current
        .iter()
        .filter(|(path, hash)| previous.get(*path) != Some(*hash))
        .map(|(path, _)| path.clone())
        .collect();
    changed.sort();
    changed
}
