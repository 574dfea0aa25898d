//! `build` command: one-shot build, optionally followed by watch mode.
//!
//! Phases:
//! - **Load** - read and validate the data directory
//! - **Build** - evaluate, render, write changed pages, copy static files
//! - **Report** - summary line, then each failure or withheld page
//! - **Watch** (`--watch`) - rebuild on change until Ctrl+C

use anyhow::{Context, Result, bail};

use crate::build::{BuildReport, Site};
use crate::config::SiteConfig;
use crate::core::state::{is_shutdown, register_watch};
use crate::log;
use crate::logger::{ProgressLine, error_chain};
use crate::utils::plural_count;
use crate::watch::{WatchService, spawn_watcher, stop_channel};

pub fn run(config: SiteConfig, watch: bool) -> Result<()> {
    if watch {
        return build_and_watch(config);
    }

    let mut site = Site::new(config);
    let report = build_once(&mut site)?;
    if !report.is_success() {
        bail!(
            "build failed: {}",
            plural_count(report.failed.len(), "page")
        );
    }
    Ok(())
}

/// Load, build with a progress line, and log the outcome.
fn build_once(site: &mut Site) -> Result<BuildReport> {
    let registry = site.load().context("invalid site data")?;

    let progress = ProgressLine::new(&[("pages", registry.pages().len())]);
    let report = site.build(&registry, |_| progress.inc("pages"));
    progress.finish();

    log_report(site, &report);
    Ok(report)
}

fn log_report(site: &Site, report: &BuildReport) {
    let mode = if site.config().build.strict {
        "strict"
    } else {
        "lenient"
    };
    log!(
        "build";
        "{} written, {} unchanged, {} failed ({}, {})",
        report.succeeded.len(),
        report.unchanged.len(),
        report.failed.len(),
        plural_count(report.evaluations, "record"),
        mode
    );

    for failure in &report.failed {
        log!("error"; "{}: {}", failure.output.display(), error_chain(&failure.error));
    }
    if !report.withheld.is_empty() {
        log!(
            "build";
            "withheld {}",
            plural_count(report.withheld.len(), "page")
        );
        for output in &report.withheld {
            crate::debug!("build"; "withheld {}", output.display());
        }
    }
}

/// Initial build, then rebuild on change until Ctrl+C.
///
/// The watcher starts before the initial build so edits made while it runs
/// are not lost. A failing initial build does not prevent watching.
fn build_and_watch(config: SiteConfig) -> Result<()> {
    let events = spawn_watcher(config.watched_dirs()).context("failed to start file watcher")?;
    let (stop, signal) = stop_channel();
    register_watch(stop);

    let window = config.watch.debounce();
    let output = config.build.output.clone();
    let root = config.root.clone();
    let mut site = Site::new(config);

    if let Err(e) = build_once(&mut site) {
        log!("error"; "{:#}", e);
    }
    if is_shutdown() {
        return Ok(());
    }

    let hashes = site.hashes().clone();
    let service = WatchService::new(site, window, vec![output])
        .with_root(root)
        .with_hashes(hashes);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    let stats = rt.block_on(service.run(events, signal));

    crate::debug!(
        "watch";
        "{}, {} failed",
        plural_count(stats.rebuilds, "rebuild"),
        stats.failures
    );
    Ok(())
}
