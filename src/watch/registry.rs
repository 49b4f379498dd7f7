// src/watch/registry.rs

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use crate::errors::{LesswatchError, Result};

/// Something that can put a single directory under watch.
///
/// Production uses `notify`'s `RecommendedWatcher`; tests provide a fake
/// that just records directories.
pub trait DirWatcher: Send {
    fn watch_dir(&mut self, dir: &Path) -> notify::Result<()>;
}

impl DirWatcher for RecommendedWatcher {
    fn watch_dir(&mut self, dir: &Path) -> notify::Result<()> {
        self.watch(dir, RecursiveMode::NonRecursive)
    }
}

/// Set of directories currently registered with the watcher.
///
/// Each directory is watched non-recursively; new subdirectories are added
/// as their create events arrive. Entries are never removed, so a long
/// session that creates and deletes many directories keeps growing.
// TODO: `unwatch` registered directories when they are deleted.
pub struct WatchRegistry<W: DirWatcher> {
    watcher: W,
    dirs: BTreeSet<PathBuf>,
}

impl<W: DirWatcher> std::fmt::Debug for WatchRegistry<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchRegistry")
            .field("dirs", &self.dirs)
            .finish_non_exhaustive()
    }
}

impl<W: DirWatcher> WatchRegistry<W> {
    pub fn new(watcher: W) -> Self {
        Self {
            watcher,
            dirs: BTreeSet::new(),
        }
    }

    /// Register a single directory. Returns `false` if it was already
    /// registered.
    pub fn register(&mut self, dir: &Path) -> Result<bool> {
        if self.dirs.contains(dir) {
            return Ok(false);
        }
        self.watcher
            .watch_dir(dir)
            .map_err(|source| LesswatchError::WatchRegistration {
                path: dir.to_path_buf(),
                source,
            })?;
        debug!(?dir, "watching directory");
        self.dirs.insert(dir.to_path_buf());
        Ok(true)
    }

    /// Register `root` and every directory below it. Returns the number of
    /// newly registered directories.
    pub fn register_tree(&mut self, root: &Path) -> Result<usize> {
        let mut added = 0;
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            if self.register(&dir)? {
                added += 1;
            }
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    stack.push(path);
                }
            }
        }
        Ok(added)
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
