//! Filesystem event source: notify watcher bridged into a tokio channel.

use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

/// How often the bridge thread re-checks watch roots while idle.
const MAINTAIN_INTERVAL: Duration = Duration::from_secs(1);

/// Watch-root consistency manager.
///
/// - Attach existing roots at startup
/// - Re-attach roots that were removed and recreated
struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            attached: FxHashSet::default(),
        }
    }

    fn attach_existing(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        for path in &self.desired {
            if !path.exists() {
                continue;
            }
            watcher.watch(path, RecursiveMode::Recursive)?;
            self.attached.insert(path.clone());
        }
        Ok(())
    }

    fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }
            if watcher.watch(path, RecursiveMode::Recursive).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "re-attached watch: {}", path.display());
            }
        }
    }
}

/// Start watching `paths`.
///
/// The watcher starts immediately, so events that happen during the initial
/// build are buffered rather than lost. The returned receiver closes when
/// the watcher dies; dropping it stops the watcher.
pub fn spawn_watcher(paths: Vec<PathBuf>) -> notify::Result<mpsc::Receiver<notify::Event>> {
    // notify is sync-only
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = notify_tx.send(res);
    })?;

    let mut roots = WatchRoots::new(paths);
    roots.attach_existing(&mut watcher)?;

    let (async_tx, async_rx) = mpsc::channel::<notify::Event>(64);

    std::thread::spawn(move || {
        loop {
            match notify_rx.recv_timeout(MAINTAIN_INTERVAL) {
                Ok(Ok(event)) => {
                    if async_tx.blocking_send(event).is_err() {
                        break; // receiver dropped
                    }
                }
                Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
                Err(RecvTimeoutError::Timeout) => roots.maintain(&mut watcher),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        drop(watcher);
    });

    Ok(async_rx)
}
