//! Declarative particle data: loading and validation.
//!
//! Every `*.toml` file under the data directory may declare `[[record]]` and
//! `[[page]]` tables. Files are read in sorted path order so duplicate
//! detection and category expansion are deterministic.
//!
//! Loading only reads and validates. Numeric evaluation happens later, in
//! [`crate::formula`].

pub mod error;
mod page;
mod record;
mod source;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use jwalk::WalkDir;
use regex::Regex;
use rustc_hash::FxHashMap;

pub use error::{LoadError, ValidationError};
pub use page::PageSpec;
pub use record::{Category, Coefficient, Correction, FormulaRecord, Quantity};

use source::{RawPage, SourceFile};

/// Context keys a record identifier may not shadow.
pub const RESERVED_KEYS: [&str; 3] = ["page", "records", "items"];

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Immutable set of records and pages for one build invocation.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    records: Vec<FormulaRecord>,
    index: FxHashMap<String, usize>,
    pages: Vec<PageSpec>,
}

impl Registry {
    /// Load every data file under `dir`.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let mut sources = Vec::new();
        for path in collect_data_files(dir)? {
            let content = fs::read_to_string(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            sources.push((path, content));
        }

        let registry = Self::from_sources(&sources)?;
        crate::debug!("data"; "{} from {}",
            crate::utils::plural_count(registry.records.len(), "record"),
            crate::utils::plural_count(sources.len(), "file"));
        Ok(registry)
    }

    /// Build a registry from in-memory `(path, content)` pairs.
    pub fn from_sources(sources: &[(PathBuf, String)]) -> Result<Self, ValidationError> {
        let mut registry = Self::default();
        let mut raw_pages: Vec<(PathBuf, RawPage)> = Vec::new();

        for (path, content) in sources {
            let file = SourceFile::parse(path, content)?;
            for raw in file.record {
                registry.insert_record(raw.into_record(path)?)?;
            }
            raw_pages.extend(file.page.into_iter().map(|page| (path.clone(), page)));
        }

        // Pages resolve against the complete record set.
        let mut outputs: FxHashMap<PathBuf, PathBuf> = FxHashMap::default();
        for (path, raw) in raw_pages {
            let page = registry.resolve_page(&path, raw)?;
            if let Some(first) = outputs.get(&page.output) {
                return Err(ValidationError::DuplicateOutput {
                    output: page.output,
                    first: first.clone(),
                });
            }
            outputs.insert(page.output.clone(), path);
            registry.pages.push(page);
        }

        Ok(registry)
    }

    /// Parse a single TOML document. Convenient for tests and fixtures.
    pub fn from_toml(content: &str) -> Result<Self, ValidationError> {
        Self::from_sources(&[(PathBuf::from("<inline>"), content.to_string())])
    }

    fn insert_record(&mut self, record: FormulaRecord) -> Result<(), ValidationError> {
        if !IDENTIFIER.is_match(&record.id) {
            return Err(ValidationError::InvalidIdentifier { id: record.id });
        }
        if RESERVED_KEYS.contains(&record.id.as_str()) {
            return Err(ValidationError::ReservedIdentifier { id: record.id });
        }
        if let Some(&existing) = self.index.get(&record.id) {
            return Err(ValidationError::DuplicateRecord {
                id: record.id,
                first: self.records[existing].source.clone(),
            });
        }

        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    fn resolve_page(&self, source: &Path, raw: RawPage) -> Result<PageSpec, ValidationError> {
        if !page::is_safe_output(&raw.output) {
            return Err(ValidationError::InvalidOutput { output: raw.output });
        }

        let mut records = Vec::with_capacity(raw.records.len());
        for id in raw.records {
            if !self.index.contains_key(&id) {
                return Err(ValidationError::UnknownRecord {
                    output: raw.output,
                    id,
                });
            }
            if !records.contains(&id) {
                records.push(id);
            }
        }

        // Selectors append in declaration order, skipping repeats. A
        // `strangeness` list narrows what the selectors pull in; explicitly
        // listed records are always kept.
        let wanted = |record: &FormulaRecord| {
            raw.strangeness.is_empty() || raw.strangeness.contains(&record.strangeness)
        };
        let mut append = |record: &FormulaRecord| {
            if wanted(record) && !records.contains(&record.id) {
                records.push(record.id.clone());
            }
        };

        for category in &raw.categories {
            self.records
                .iter()
                .filter(|r| r.category == *category)
                .for_each(&mut append);
        }
        for family in &raw.families {
            let members: Vec<_> = self
                .records
                .iter()
                .filter(|r| r.family.as_deref() == Some(family.as_str()))
                .collect();
            if members.is_empty() {
                return Err(ValidationError::UnknownFamily {
                    output: raw.output,
                    family: family.clone(),
                });
            }
            members.into_iter().for_each(&mut append);
        }

        Ok(PageSpec {
            template: raw.template,
            records,
            output: raw.output,
            title: raw.title,
            source: source.to_path_buf(),
        })
    }

    /// All records, in declaration order.
    pub fn records(&self) -> &[FormulaRecord] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&FormulaRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn pages(&self) -> &[PageSpec] {
        &self.pages
    }
}

/// Collect `*.toml` files under `dir`, sorted.
fn collect_data_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "data directory not found"),
        });
    }

    let mut files = Vec::new();
    let walk_error = |err: jwalk::Error| LoadError::Io {
        path: dir.to_path_buf(),
        source: std::io::Error::from(err),
    };
    for entry in WalkDir::new(dir) {
        let mut entry = entry.map_err(walk_error)?;
        if let Some(err) = entry.read_children_error.take() {
            return Err(walk_error(err));
        }
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
