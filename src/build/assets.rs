//! Static asset copy-through.

use std::fs;
use std::io;
use std::path::Path;

use jwalk::WalkDir;

use crate::freshness::hash_file;

/// Mirror every file under `source` into `dest`.
///
/// Files whose destination already has identical content are skipped.
/// Returns the number of files copied. A missing `source` copies nothing.
pub fn copy_static(source: &Path, dest: &Path) -> io::Result<usize> {
    if !source.is_dir() {
        return Ok(0);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(source) {
        let mut entry = entry.map_err(io::Error::from)?;
        // jwalk parks a failed directory read on the directory's own entry.
        if let Some(err) = entry.read_children_error.take() {
            return Err(io::Error::from(err));
        }
        if entry.file_type().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut copied = 0;
    for path in files {
        let Ok(relative) = path.strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);

        if target.is_file() && hash_file(&target).is_some_and(|h| hash_file(&path) == Some(h)) {
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&path, &target)?;
        copied += 1;
    }

    Ok(copied)
}
