//! Full-site build orchestration.
//!
//! A build runs in three phases:
//! - **Render** - every page in parallel: evaluate its records through the
//!   per-build memo, render the template, hash the bytes
//! - **Decide** - apply the failure policy (lenient or strict)
//! - **Write** - atomically write changed artifacts, record their hashes
//!
//! The hash table is the only state carried from one build to the next.

mod assets;
mod site;
mod write;


pub use assets::copy_static;
pub use site::Site;
pub use write::write_atomic;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::config::ConfigError;
use crate::data::{LoadError, PageSpec, Registry};
use crate::formula::{EvaluatedValue, Evaluator, MalformedFormulaError};
use crate::freshness::{ContentHash, HashTable, hash_bytes};
use crate::render::{Renderer, TemplateError};

// ============================================================================
// Errors & report
// ============================================================================

/// Why one page did not make it to disk.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Formula(#[from] MalformedFormulaError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to write `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a rebuild produced no report at all.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("invalid site config")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// A failed page, keyed by its output path.
#[derive(Debug)]
pub struct PageFailure {
    pub output: PathBuf,
    pub error: PageError,
}

/// Outcome of one full build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Written this build.
    pub succeeded: Vec<PathBuf>,
    /// Rendered identical to the last write; not rewritten.
    pub unchanged: Vec<PathBuf>,
    /// Rendered fine but not written because another page failed (strict).
    pub withheld: Vec<PathBuf>,
    pub failed: Vec<PageFailure>,
    /// Output path to hash after this build.
    pub hashes: HashTable,
    /// Records evaluated (each at most once per build).
    pub evaluations: usize,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of pages in the build.
    pub fn page_count(&self) -> usize {
        self.succeeded.len() + self.unchanged.len() + self.withheld.len() + self.failed.len()
    }
}

// ============================================================================
// BuildContext
// ============================================================================

/// Per-build evaluation memo.
///
/// A record referenced by many pages is evaluated once; later pages get the
/// cached result (including a cached failure).
pub struct BuildContext<'a> {
    registry: &'a Registry,
    evaluator: Evaluator,
    memo: DashMap<String, Result<EvaluatedValue, MalformedFormulaError>>,
    evaluations: AtomicUsize,
}

impl<'a> BuildContext<'a> {
    pub fn new(registry: &'a Registry, evaluator: Evaluator) -> Self {
        Self {
            registry,
            evaluator,
            memo: DashMap::new(),
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Evaluated value for `id`; `None` if the registry has no such record.
    pub fn value(&self, id: &str) -> Option<Result<EvaluatedValue, MalformedFormulaError>> {
        let record = self.registry.record(id)?;
        let entry = self.memo.entry(id.to_string()).or_insert_with(|| {
            self.evaluations.fetch_add(1, Ordering::Relaxed);
            self.evaluator.evaluate(record)
        });
        Some(entry.value().clone())
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// One rendered page, not yet written.
struct Artifact {
    output: PathBuf,
    bytes: Vec<u8>,
    hash: ContentHash,
}

/// Drives evaluation, rendering, and writing for every page.
#[derive(Debug)]
pub struct Orchestrator {
    output_dir: PathBuf,
    evaluator: Evaluator,
    strict: bool,
    hashes: HashTable,
}

impl Orchestrator {
    pub fn new(output_dir: impl Into<PathBuf>, evaluator: Evaluator) -> Self {
        Self {
            output_dir: output_dir.into(),
            evaluator,
            strict: false,
            hashes: HashTable::default(),
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Swap the evaluator and failure policy; the hash table is kept.
    pub fn set_policy(&mut self, evaluator: Evaluator, strict: bool) {
        self.evaluator = evaluator;
        self.strict = strict;
    }

    /// Hashes of the last successful write per output path.
    pub fn hashes(&self) -> &HashTable {
        &self.hashes
    }

    pub fn build_all(&mut self, registry: &Registry, renderer: &Renderer) -> BuildReport {
        self.build_all_with(registry, renderer, |_| {})
    }

    /// Build every page, calling `on_page` as each one finishes rendering.
    pub fn build_all_with<F>(
        &mut self,
        registry: &Registry,
        renderer: &Renderer,
        on_page: F,
    ) -> BuildReport
    where
        F: Fn(&PageSpec) + Sync,
    {
        let ctx = BuildContext::new(registry, self.evaluator);

        let results: Vec<(PathBuf, Result<Artifact, PageError>)> = registry
            .pages()
            .par_iter()
            .map(|page| {
                let result = render_page(&ctx, renderer, page);
                on_page(page);
                (page.output.clone(), result)
            })
            .collect();

        let mut report = BuildReport {
            evaluations: ctx.evaluations(),
            ..Default::default()
        };

        let mut artifacts = Vec::with_capacity(results.len());
        for (output, result) in results {
            match result {
                Ok(artifact) => artifacts.push(artifact),
                Err(error) => report.failed.push(PageFailure { output, error }),
            }
        }

        if self.strict && !report.failed.is_empty() {
            report.withheld = artifacts.into_iter().map(|a| a.output).collect();
        } else {
            for artifact in artifacts {
                self.write_artifact(artifact, &mut report);
            }
        }

        // Forget pages that no longer exist.
        let live: FxHashSet<&Path> = registry.pages().iter().map(|p| p.output.as_path()).collect();
        self.hashes.retain(|path, _| live.contains(path.as_path()));

        report.hashes = self.hashes.clone();
        report
    }

    fn write_artifact(&mut self, artifact: Artifact, report: &mut BuildReport) {
        let path = self.output_dir.join(&artifact.output);

        if self.hashes.get(&artifact.output) == Some(&artifact.hash) && path.is_file() {
            report.unchanged.push(artifact.output);
            return;
        }

        match write_atomic(&path, &artifact.bytes) {
            Ok(()) => {
                self.hashes.insert(artifact.output.clone(), artifact.hash);
                report.succeeded.push(artifact.output);
            }
            Err(source) => report.failed.push(PageFailure {
                output: artifact.output,
                error: PageError::Io { path, source },
            }),
        }
    }
}

/// Evaluate, render, and hash one page.
fn render_page(
    ctx: &BuildContext<'_>,
    renderer: &Renderer,
    page: &PageSpec,
) -> Result<Artifact, PageError> {
    let mut values = FxHashMap::default();
    for id in &page.records {
        // Unknown ids surface as a missing binding from the renderer.
        if let Some(value) = ctx.value(id) {
            values.insert(id.clone(), value?);
        }
    }

    let bytes = renderer.render(page, &values)?;
    Ok(Artifact {
        output: page.output.clone(),
        hash: hash_bytes(&bytes),
        bytes,
    })
}
