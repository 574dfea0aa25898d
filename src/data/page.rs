//! Page specifications: one output document bound to a template.

use std::path::{Component, Path, PathBuf};

/// One output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    /// Template name, relative to the templates directory.
    pub template: String,
    /// Record identifiers bound into the page, in order.
    pub records: Vec<String>,
    /// Output path, relative to the output directory.
    pub output: PathBuf,
    pub title: Option<String>,
    /// File the page was declared in.
    pub source: PathBuf,
}

impl PageSpec {
    pub fn new(template: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            records: Vec::new(),
            output: output.into(),
            title: None,
            source: PathBuf::new(),
        }
    }

    pub fn with_records<I, S>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.records = records.into_iter().map(Into::into).collect();
        self
    }
}

/// Relative, non-empty, and never escaping the output root.
pub(super) fn is_safe_output(path: &Path) -> bool {
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        return false;
    }
    components.all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_output() {
        assert!(is_safe_output(Path::new("index.html")));
        assert!(is_safe_output(Path::new("baryons/octet.html")));
        assert!(!is_safe_output(Path::new("")));
        assert!(!is_safe_output(Path::new("../escape.html")));
        assert!(!is_safe_output(Path::new("/etc/passwd")));
        assert!(!is_safe_output(Path::new("a/../../b.html")));
    }
}
