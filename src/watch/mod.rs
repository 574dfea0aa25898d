//! Watch mode: rebuild the site when its inputs change.
//!
//! # Architecture
//!
//! ```text
//! notify ──▶ bridge thread ──▶ mpsc ──▶ WatchService::run
//!                                          │ ChangeSet (filter, dedup)
//!                                          │ WatchMachine (debounce)
//!                                          ▼
//!                                  spawn_blocking(rebuild)
//! ```
//!
//! At most one rebuild runs at a time: the [`Rebuild`] implementor is moved
//! into the blocking task and handed back when it finishes. Changes seen
//! during a rebuild schedule exactly one follow-up rebuild.

mod changes;
mod source;
mod state;


pub use changes::{ChangeKind, ChangeSet};
pub use source::spawn_watcher;
pub use state::WatchMachine;

use std::future::pending;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, sleep_until};

use crate::build::{BuildReport, RebuildError, Site};
use crate::freshness::{HashTable, changed_outputs};
use crate::logger::{error_chain, status_error, status_success, status_unchanged};
use crate::utils::path::relative_to;

/// Something that can rebuild the whole site.
pub trait Rebuild: Send + 'static {
    fn rebuild(&mut self) -> Result<BuildReport, RebuildError>;
}

impl Rebuild for Site {
    fn rebuild(&mut self) -> Result<BuildReport, RebuildError> {
        Site::rebuild(self)
    }
}

/// Requests the watch loop to stop. Cloneable, callable from any thread.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<watch::Sender<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.send_replace(true);
    }
}

/// Receiving side of a [`StopHandle`].
#[derive(Debug)]
pub struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    /// Resolves once stop is requested or every handle is dropped.
    async fn wait(&mut self) {
        let _ = self.0.wait_for(|stopped| *stopped).await;
    }
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle(Arc::new(tx)), StopSignal(rx))
}

/// Counters returned when the loop exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchStats {
    pub rebuilds: usize,
    pub failures: usize,
}

type InFlight<R> = JoinHandle<(R, Result<BuildReport, RebuildError>)>;

/// Debounced rebuild loop.
pub struct WatchService<R: Rebuild> {
    site: R,
    window: Duration,
    ignored: Vec<PathBuf>,
    root: PathBuf,
    hashes: HashTable,
}

impl<R: Rebuild> WatchService<R> {
    /// `ignored` roots (the output directory) never trigger a rebuild.
    pub fn new(site: R, window: Duration, ignored: Vec<PathBuf>) -> Self {
        Self {
            site,
            window,
            ignored,
            root: PathBuf::new(),
            hashes: HashTable::default(),
        }
    }

    /// Site root; changed paths are logged relative to it.
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    /// Hash table from the initial build, for diffing the first rebuild.
    pub fn with_hashes(mut self, hashes: HashTable) -> Self {
        self.hashes = hashes;
        self
    }

    /// Run until stopped or until `events` closes.
    ///
    /// On stop, a rebuild already in flight is awaited; nothing new starts.
    pub async fn run(
        self,
        mut events: mpsc::Receiver<notify::Event>,
        mut stop: StopSignal,
    ) -> WatchStats {
        let Self {
            site,
            window,
            ignored,
            root,
            hashes,
        } = self;

        let mut machine = WatchMachine::new(window);
        let mut changes = ChangeSet::new(ignored);
        let mut outcome = Outcome {
            hashes,
            stats: WatchStats::default(),
        };
        let mut idle: Option<R> = Some(site);
        let mut in_flight: Option<InFlight<R>> = None;

        crate::log!("watch"; "watching for changes");

        while !machine.is_stopped() {
            tokio::select! {
                biased;

                _ = stop.wait() => machine.stop(),

                joined = join(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    match joined {
                        Ok((site, result)) => {
                            idle = Some(site);
                            outcome.record(result);
                            machine.on_rebuild_done(Instant::now());
                        }
                        Err(e) => {
                            // The site went down with the task; nothing left to rebuild with.
                            crate::log!("error"; "rebuild task panicked: {}", e);
                            outcome.stats.failures += 1;
                            machine.stop();
                        }
                    }
                }

                event = events.recv() => match event {
                    Some(event) => {
                        if changes.add_event(&event) {
                            machine.on_change(Instant::now());
                        }
                    }
                    None => {
                        crate::debug!("watch"; "event source closed");
                        machine.stop();
                    }
                },

                _ = sleep_until_deadline(machine.deadline()), if machine.deadline().is_some() => {
                    if machine.poll(Instant::now())
                        && let Some(mut site) = idle.take()
                    {
                        log_changes(&changes.take(), &root);
                        in_flight = Some(tokio::task::spawn_blocking(move || {
                            let result = site.rebuild();
                            (site, result)
                        }));
                    }
                }
            }
        }

        if let Some(handle) = in_flight {
            crate::debug!("watch"; "waiting for in-flight rebuild");
            match handle.await {
                Ok((_, result)) => outcome.record(result),
                Err(e) => {
                    crate::log!("error"; "rebuild task panicked: {}", e);
                    outcome.stats.failures += 1;
                }
            }
        }

        crate::log!("watch"; "stopped");
        outcome.stats
    }
}

/// Bookkeeping across rebuilds.
struct Outcome {
    hashes: HashTable,
    stats: WatchStats,
}

impl Outcome {
    fn record(&mut self, result: Result<BuildReport, RebuildError>) {
        self.stats.rebuilds += 1;

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                self.stats.failures += 1;
                status_error("rebuild failed", &error_chain(&e));
                return;
            }
        };

        let changed = changed_outputs(&self.hashes, &report.hashes);
        self.hashes = report.hashes.clone();

        if !report.is_success() {
            self.stats.failures += 1;
            let detail = report
                .failed
                .iter()
                .map(|f| format!("{}: {}", f.output.display(), error_chain(&f.error)))
                .collect::<Vec<_>>()
                .join("\n");
            let summary = format!(
                "{} failed",
                crate::utils::plural_count(report.failed.len(), "page")
            );
            status_error(&summary, &detail);
            return;
        }

        if changed.is_empty() {
            status_unchanged("no output changed");
        } else {
            let names: Vec<_> = changed.iter().map(|p| p.display().to_string()).collect();
            status_success(&format!("rebuilt: {}", names.join(", ")));
        }
    }
}

fn log_changes(changes: &[(PathBuf, ChangeKind)], root: &Path) {
    for (path, kind) in changes {
        crate::debug!("watch"; "{} {}", kind.label(), relative_to(path, root).display());
    }
    crate::debug!("watch"; "rebuilding after {}", crate::utils::plural_count(changes.len(), "change"));
}

async fn join<T>(handle: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
