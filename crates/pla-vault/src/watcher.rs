//! File system watcher feeding metadata-update events into a [`Vault`].
//!
//! Uses the `notify` crate for cross-platform file system events
//! (FSEvents on macOS, inotify on Linux, ReadDirectoryChanges on Windows).
//! Events are delivered over a channel and applied on the caller's thread,
//! one at a time, so a recomputation never interleaves with another.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use pla_core::{DocumentId, PlaError};

use crate::vault::{is_markdown, Vault};

/// A change to one note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// A note was created or modified.
    Changed(PathBuf),
    /// A note was deleted.
    Removed(PathBuf),
}

impl VaultEvent {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed(p) | Self::Removed(p) => p,
        }
    }
}

/// Watches a vault directory and emits [`VaultEvent`]s for markdown notes.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<VaultEvent>,
}

impl VaultWatcher {
    /// Start watching a vault directory for changes.
    ///
    /// # Errors
    ///
    /// Returns [`PlaError::Io`] if the watcher cannot be created.
    pub fn start(vault_root: &Path) -> Result<Self, PlaError> {
        let (tx, rx) = mpsc::channel();
        let root = vault_root.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "vault watch error");
                    return;
                }
            };
            for path in &event.paths {
                if !is_markdown(path) || in_hidden_dir(&root, path) {
                    continue;
                }
                let vault_event = match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) => VaultEvent::Changed(path.clone()),
                    EventKind::Remove(_) => VaultEvent::Removed(path.clone()),
                    _ => continue,
                };
                let _ = tx.send(vault_event);
            }
        })
        .map_err(|e| PlaError::Io(std::io::Error::other(e)))?;

        watcher
            .watch(vault_root, RecursiveMode::Recursive)
            .map_err(|e| PlaError::Io(std::io::Error::other(e)))?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<VaultEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&self) -> Option<VaultEvent> {
        self.receiver.try_recv().ok()
    }
}

fn in_hidden_dir(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .ok()
        .and_then(|rel| rel.components().next())
        .and_then(|c| c.as_os_str().to_str())
        .is_some_and(|s| s.starts_with('.'))
}

impl Vault {
    /// Apply a watcher event, returning the id of the note it touched.
    ///
    /// # Errors
    ///
    /// Returns [`PlaError::Io`] if a changed note cannot be read.
    pub fn apply(&mut self, event: &VaultEvent) -> Result<Option<DocumentId>, PlaError> {
        self.reload(event.path())
    }
}
