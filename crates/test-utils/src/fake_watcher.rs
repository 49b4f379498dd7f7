use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lesswatch::watch::DirWatcher;

/// Directory watcher that only records registrations.
///
/// Set `fail_on` to make registering that exact directory fail.
#[derive(Debug, Clone, Default)]
pub struct FakeDirWatcher {
    registered: Arc<Mutex<Vec<PathBuf>>>,
    fail_on: Option<PathBuf>,
}

impl FakeDirWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(path: impl Into<PathBuf>) -> Self {
        Self {
            registered: Arc::default(),
            fail_on: Some(path.into()),
        }
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.registered.lock().unwrap().clone()
    }
}

impl DirWatcher for FakeDirWatcher {
    fn watch_dir(&mut self, dir: &Path) -> notify::Result<()> {
        if self.fail_on.as_deref() == Some(dir) {
            return Err(notify::Error::generic("fake watch limit reached").add_path(dir.to_path_buf()));
        }
        self.registered.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }
}
