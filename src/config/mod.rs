//! Site configuration management for `lambda7.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build] and [watch]
//! ├── error          # ConfigError
//! ├── util           # Config file discovery
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The config file is optional: without one, defaults apply with the
//! current directory as the site root.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{BuildSectionConfig, WatchSectionConfig};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::log;
use crate::utils::path::normalize_path;
use util::find_config_file;

/// Default config file name.
pub const CONFIG_FILE: &str = "lambda7.toml";

/// Root configuration structure representing lambda7.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file, empty when running on defaults.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site root: the config file's directory, or cwd.
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub watch: WatchSectionConfig,

    /// Command-line overrides, reapplied on reload.
    #[serde(skip)]
    overrides: Overrides,
}

/// Values given on the command line that win over the config file.
#[derive(Debug, Clone, Default)]
struct Overrides {
    output: Option<PathBuf>,
    strict: bool,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file, applies CLI overrides,
    /// then validates.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = normalize_path(&path);
                config
            }
            None if cli.config != Path::new(CONFIG_FILE) => {
                bail!(ConfigError::Validation(format!(
                    "config file `{}` not found",
                    cli.config.display()
                )));
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };

        let root = config
            .config_path
            .parent()
            .map_or_else(|| cwd.clone(), Path::to_path_buf);

        config.apply_command_options(cli);
        config.finalize(&root);
        config.validate()?;

        Ok(config)
    }

    /// Default configuration rooted at `root`, already normalized.
    pub fn for_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.finalize(root);
        config
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Re-read the config file, keeping this config's root and CLI overrides.
    pub fn reload(&self) -> Result<Self, ConfigError> {
        let mut config = Self::from_path(&self.config_path)?;
        config.config_path = self.config_path.clone();
        config.overrides = self.overrides.clone();
        config.apply_overrides();
        config.finalize(&self.root);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    /// Directories whose changes trigger a rebuild in watch mode.
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            self.build.data.clone(),
            self.build.templates.clone(),
            self.build.static_dir.clone(),
        ];
        if !self.config_path.as_os_str().is_empty() {
            dirs.push(self.config_path.clone());
        }
        dirs
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        self.overrides = Overrides {
            output: args.output.clone(),
            strict: args.strict,
        };
        self.apply_overrides();
    }

    fn apply_overrides(&mut self) {
        Self::update_option(&mut self.build.output, self.overrides.output.as_ref());
        if self.overrides.strict {
            self.build.strict = true;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // normalization & validation
    // ========================================================================

    fn finalize(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.build.normalize(&root);
        self.root = root;
    }

    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        self.build.validate(&mut errors);
        self.watch.validate(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
