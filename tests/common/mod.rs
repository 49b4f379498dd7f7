#![allow(dead_code, unused_imports)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

pub use lesswatch_test_utils::builders::{fake_compiler, ConfigBuilder};
pub use lesswatch_test_utils::fake_backend::{FakeBackend, RecordingBuildContext};
pub use lesswatch_test_utils::fake_watcher::FakeDirWatcher;
pub use lesswatch_test_utils::{epoch_plus, init_tracing, set_mtime, with_timeout, write_with_mtime};

/// Temporary project with `src/` (existing) and `out/` (created on demand).
pub struct Fixture {
    _dir: TempDir,
    pub root: PathBuf,
    pub src: PathBuf,
    pub out: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        // Canonical so paths match what the watch engine computes.
        let root = dir.path().canonicalize().expect("canonicalize temp dir");
        let src = root.join("src");
        let out = root.join("out");
        fs::create_dir_all(&src).expect("create src dir");
        Self {
            _dir: dir,
            root,
            src,
            out,
        }
    }

    /// Write a source file with mtime `epoch_plus(secs)`.
    pub fn source(&self, rel: &str, contents: &str, secs: u64) -> PathBuf {
        let path = self.src.join(rel);
        write_with_mtime(&path, contents, epoch_plus(secs));
        path
    }

    /// Write an output file with mtime `epoch_plus(secs)`.
    pub fn output(&self, rel: &str, contents: &str, secs: u64) -> PathBuf {
        let path = self.out.join(rel);
        write_with_mtime(&path, contents, epoch_plus(secs));
        path
    }

    pub fn config(&self) -> ConfigBuilder {
        ConfigBuilder::new(&self.src, &self.out)
    }
}
