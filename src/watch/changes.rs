//! Change aggregation between rebuilds.

use std::path::{Path, PathBuf};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashMap;

use crate::utils::path::normalize_path;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Paths changed since the last rebuild started.
///
/// Timing lives in [`super::WatchMachine`]; this only filters and dedups.
pub struct ChangeSet {
    changes: FxHashMap<PathBuf, ChangeKind>,
    /// Events under these roots never trigger a rebuild (the output dir).
    ignored: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn new(ignored: Vec<PathBuf>) -> Self {
        Self {
            changes: FxHashMap::default(),
            ignored,
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Record a notify event. Returns `true` if any path in it is relevant.
    ///
    /// Dedup rules per path:
    /// - Removed then Created/Modified: the new kind
    /// - Modified then Removed: Removed
    /// - Created then Removed: dropped
    /// - otherwise the first event wins
    pub fn add_event(&mut self, event: &notify::Event) -> bool {
        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // mtime/atime/chmod noise; our own writes would loop forever
            EventKind::Modify(ModifyKind::Metadata(_)) => return false,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return false,
        };

        let mut relevant = false;
        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }

            let path = normalize_path(path);
            if self.ignored.iter().any(|root| path.starts_with(root)) {
                continue;
            }
            relevant = true;

            match self.changes.get(&path).copied() {
                None => {
                    crate::debug!("watch"; "{}: {}", kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                Some(_) => {}
            }
        }
        relevant
    }

    /// Drain the recorded changes, sorted by path.
    pub fn take(&mut self) -> Vec<(PathBuf, ChangeKind)> {
        let mut changes: Vec<_> = std::mem::take(&mut self.changes).into_iter().collect();
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        changes
    }
}

/// Editor artifacts: backups, swap files, dotfiles.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
