use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::store::DATA_DIR;

/// File lifecycle events that affect bookmarks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// `(old, new)` pairs of renamed files or directories
    Renamed(Vec<(PathBuf, PathBuf)>),
    /// Deleted files or directories
    Deleted(Vec<PathBuf>),
}

/// Map a raw notify event to a lifecycle event. Anything inside the
/// workspace's own data directory is ignored.
pub fn classify_event(event: Event, root: &Path) -> Option<FileEvent> {
    let data_dir = root.join(DATA_DIR);
    let relevant = |p: &PathBuf| p.starts_with(root) && !p.starts_with(&data_dir);

    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let [from, to] = <[PathBuf; 2]>::try_from(event.paths).ok()?;
            if relevant(&from) || relevant(&to) {
                Some(FileEvent::Renamed(vec![(from, to)]))
            } else {
                None
            }
        }
        EventKind::Remove(_) => {
            let gone: Vec<PathBuf> = event.paths.into_iter().filter(|p| relevant(p)).collect();
            if gone.is_empty() {
                None
            } else {
                Some(FileEvent::Deleted(gone))
            }
        }
        _ => None,
    }
}

/// A recursive watcher over a workspace root.
pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl WorkspaceWatcher {
    /// Start watching `root` recursively.
    pub fn start(root: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let root_owned = root.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "watch error");
                        return;
                    }
                };
                if let Some(evt) = classify_event(event, &root_owned) {
                    let _ = tx.send(evt);
                }
            },
            Config::default(),
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::info!(root = %root.display(), "watching workspace");
        Ok(WorkspaceWatcher { _watcher: watcher, rx })
    }

    /// Non-blocking poll for pending file events.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block up to `timeout` for the first event, then drain the rest.
    /// Returns `None` once the watcher has shut down.
    pub fn wait(&self, timeout: Duration) -> Option<Vec<FileEvent>> {
        match self.rx.recv_timeout(timeout) {
            Ok(first) => {
                let mut events = vec![first];
                events.extend(self.poll());
                Some(events)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Some(Vec::new()),
            Err(mpsc::RecvTimeoutError::Disconnected) => None,
        }
    }
}
