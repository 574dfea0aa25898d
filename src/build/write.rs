//! Atomic file writes.
//!
//! Content goes to a temporary file in the destination directory, which is
//! then renamed over the final path. A reader sees either the old file or the
//! complete new one. On any error the temporary file is dropped (and
//! deleted), so a failed write never leaves a truncated final file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Atomically replace `path` with `bytes`, creating parent directories.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    write_atomic_with(path, |file| file.write_all(bytes))
}

/// Atomically replace `path` with whatever `fill` writes.
pub fn write_atomic_with<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".lambda7-")
        .suffix(".tmp")
        .tempfile_in(parent)?;

    fill(temp.as_file_mut())?;
    temp.as_file_mut().flush()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("baryons/octet/index.html");

        write_atomic(&path, b"<h1>octet</h1>").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<h1>octet</h1>");

        write_atomic(&path, b"<h1>replaced</h1>").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<h1>replaced</h1>");
        assert!(leftovers(path.parent().unwrap()).is_empty());
    }

    #[test]
    fn test_failure_partway_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, "previous build").unwrap();

        let result = write_atomic_with(&path, |file| {
            file.write_all(b"half of the new")?;
            Err(io::Error::other("disk full"))
        });

        assert_eq!(result.unwrap_err().to_string(), "disk full");
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous build");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_rename_over_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        fs::create_dir(&path).unwrap();

        assert!(write_atomic(&path, b"page").is_err());
        assert!(path.is_dir());
        assert!(leftovers(dir.path()).is_empty());
    }
}
