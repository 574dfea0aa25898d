//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! data = "data"               # Record and page declarations (*.toml)
//! templates = "templates"     # Jinja2 templates
//! static = "static"           # Copied to <output>/static
//! output = "dist"             # Build output directory
//! strict = false              # Write nothing if any page fails
//! precision = 10              # Significant digits in displayed values
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::path::normalize_path;

/// Valid range for `build.precision` (f64 carries 17 significant digits).
pub const PRECISION_RANGE: std::ops::RangeInclusive<usize> = 1..=17;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Data directory with `[[record]]` and `[[page]]` tables.
    pub data: PathBuf,

    /// Template directory.
    pub templates: PathBuf,

    /// Static asset directory.
    #[serde(rename = "static")]
    pub static_dir: PathBuf,

    /// Build output directory.
    pub output: PathBuf,

    /// Strict failure policy: one failed page withholds every page.
    pub strict: bool,

    /// Significant digits for displayed values.
    pub precision: usize,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            data: "data".into(),
            templates: "templates".into(),
            static_dir: "static".into(),
            output: "dist".into(),
            strict: false,
            precision: crate::formula::DEFAULT_PRECISION,
        }
    }
}

impl BuildSectionConfig {
    /// Resolve every directory against the site root.
    pub fn normalize(&mut self, root: &Path) {
        for dir in [
            &mut self.data,
            &mut self.templates,
            &mut self.static_dir,
            &mut self.output,
        ] {
            *dir = normalize_path(&root.join(&*dir));
        }
    }

    pub fn validate(&self, errors: &mut Vec<String>) {
        if !PRECISION_RANGE.contains(&self.precision) {
            errors.push(format!(
                "build.precision must be between {} and {}, got {}",
                PRECISION_RANGE.start(),
                PRECISION_RANGE.end(),
                self.precision
            ));
        }

        for (field, dir) in [
            ("build.data", &self.data),
            ("build.templates", &self.templates),
            ("build.static", &self.static_dir),
        ] {
            if dir == &self.output || dir.starts_with(&self.output) {
                errors.push(format!(
                    "{field} `{}` must not be inside build.output",
                    dir.display()
                ));
            }
        }
    }
}
