//! A configured site: config plus the orchestrator that builds it.

use std::path::PathBuf;

use crate::config::{ConfigError, SiteConfig};
use crate::data::{LoadError, PageSpec, Registry};
use crate::formula::Evaluator;
use crate::freshness::{ContentHash, HashTable, hash_file};
use crate::log;
use crate::render::Renderer;
use crate::utils::path::relative_to;

use super::{BuildReport, Orchestrator, PageError, PageFailure, RebuildError, copy_static};

/// Output subdirectory for static assets.
pub const STATIC_OUTPUT: &str = "static";

/// Owns everything a rebuild needs. Watch mode moves it into the rebuild
/// task, so only one rebuild can hold it at a time.
#[derive(Debug)]
pub struct Site {
    config: SiteConfig,
    /// Content of the config file this site was configured from.
    config_hash: Option<ContentHash>,
    orchestrator: Orchestrator,
}

impl Site {
    pub fn new(config: SiteConfig) -> Self {
        let orchestrator = Orchestrator::new(
            config.build.output.clone(),
            Evaluator::new(config.build.precision),
        )
        .with_strict(config.build.strict);
        Self {
            config_hash: hash_file(&config.config_path),
            config,
            orchestrator,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn hashes(&self) -> &HashTable {
        self.orchestrator.hashes()
    }

    /// Load and validate the data directory.
    pub fn load(&self) -> Result<Registry, LoadError> {
        Registry::load(&self.config.build.data)
    }

    /// Pick up config edits, then load, build every page, copy static assets.
    pub fn rebuild(&mut self) -> Result<BuildReport, RebuildError> {
        self.reload_config()?;
        let registry = self.load()?;
        Ok(self.build(&registry, |_| {}))
    }

    /// Re-read the config file if its content changed since it was last applied.
    ///
    /// `precision` and `strict` apply from this rebuild on. Directories and
    /// `[watch]` are fixed for the session: the watcher is already attached
    /// to them.
    fn reload_config(&mut self) -> Result<(), ConfigError> {
        if self.config.config_path.as_os_str().is_empty() {
            return Ok(());
        }
        let hash = hash_file(&self.config.config_path);
        if hash.is_some() && hash == self.config_hash {
            return Ok(());
        }

        let fresh = self.config.reload()?;
        self.config_hash = hash;

        let mut pinned = fresh.build.clone();
        pinned.precision = self.config.build.precision;
        pinned.strict = self.config.build.strict;
        if pinned != self.config.build || fresh.watch != self.config.watch {
            log!("config"; "directory and [watch] changes take effect after restart");
        }

        self.config.build.precision = fresh.build.precision;
        self.config.build.strict = fresh.build.strict;
        self.orchestrator
            .set_policy(Evaluator::new(fresh.build.precision), fresh.build.strict);
        log!("config"; "reloaded {}",
            relative_to(&self.config.config_path, &self.config.root).display());
        Ok(())
    }

    /// Build a loaded registry. Templates are re-read on every call.
    pub fn build<F>(&mut self, registry: &Registry, on_page: F) -> BuildReport
    where
        F: Fn(&PageSpec) + Sync,
    {
        let renderer = Renderer::from_dir(&self.config.build.templates, self.config.build.precision);
        let mut report = self
            .orchestrator
            .build_all_with(registry, &renderer, on_page);

        // Strict builds with failures write nothing at all.
        if self.config.build.strict && !report.failed.is_empty() {
            return report;
        }

        let dest = self.config.build.output.join(STATIC_OUTPUT);
        match copy_static(&self.config.build.static_dir, &dest) {
            Ok(0) => {}
            Ok(copied) => {
                crate::debug!("build"; "copied {}", crate::utils::plural_count(copied, "static file"));
            }
            Err(source) => report.failed.push(PageFailure {
                output: PathBuf::from(STATIC_OUTPUT),
                error: PageError::Io { path: dest, source },
            }),
        }

        report
    }
}
