//! Path helpers.

use std::path::{Component, Path, PathBuf};

/// Absolute form of `path`.
///
/// Canonicalizes when the path exists; otherwise joins it onto the current
/// directory and folds `.` and `..` lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        };
        lexical_clean(&absolute)
    })
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// `path` relative to `base` for display, or `path` itself.
pub fn relative_to<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_existing_path() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("data")).unwrap();

        // `templates` does not exist, so this folds lexically
        let normalized = normalize_path(&root.join("templates/../data/."));
        assert_eq!(normalized, root.join("data"));
        assert_eq!(normalize_path(&root.join("data")), root.join("data"));
    }

    #[test]
    fn test_normalize_missing_path() {
        assert_eq!(
            normalize_path(Path::new("/nonexistent-site/./templates/../dist")),
            PathBuf::from("/nonexistent-site/dist")
        );
    }

    #[test]
    fn test_relative_to() {
        let base = Path::new("/site");
        assert_eq!(
            relative_to(Path::new("/site/data/baryons.toml"), base),
            Path::new("data/baryons.toml")
        );
        assert_eq!(relative_to(Path::new("/elsewhere"), base), Path::new("/elsewhere"));
    }
}
