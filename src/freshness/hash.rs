//! Content hashing using blake3.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Convert to hex string (for debugging/display).
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Hash an in-memory artifact.
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    ContentHash::new(*blake3::hash(bytes).as_bytes())
}

/// Hash a file's contents; `None` if it cannot be read.
pub fn hash_file(path: &Path) -> Option<ContentHash> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return None,
        }
    }

    Some(ContentHash::new(*hasher.finalize().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_content_hash_display() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(format!("{}", hash), "abababababababab");
        assert_eq!(hash.to_hex().len(), 64);
    }

    #[test]
    fn test_file_hash_matches_bytes_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, "<h1>6π⁵</h1>").unwrap();

        assert_eq!(hash_file(&path), Some(hash_bytes("<h1>6π⁵</h1>".as_bytes())));
        assert_ne!(hash_bytes(b"a"), hash_bytes(b"b"));
    }

    #[test]
    fn test_hash_file_nonexistent() {
        assert_eq!(hash_file(Path::new("/nonexistent/file.html")), None);
    }
}
