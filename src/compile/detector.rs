// src/compile/detector.rs

//! Change detection: does a source need compiling?

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Output artifact of a source, with its state on disk at probe time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileTarget {
    pub path: PathBuf,
    /// `None` when the output does not exist.
    pub modified: Option<SystemTime>,
}

impl CompileTarget {
    /// Stat `path`. A missing file is not an error.
    pub fn probe(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let modified = match fs::metadata(&path) {
            Ok(meta) => Some(meta.modified()?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };
        Ok(Self { path, modified })
    }

    pub fn exists(&self) -> bool {
        self.modified.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decide whether a source must be (re)compiled.
///
/// - `src_modified`: newest mtime across the source and its imports.
/// - `output_modified`: mtime of the existing output, `None` if missing.
/// - `last_failure`: `src_modified` of the most recent failed compile.
///
/// A missing output always compiles. Otherwise compilation happens when
/// forced or stale, but never for a source that has not changed since the
/// last failure.
pub fn needs_compile(
    src_modified: SystemTime,
    output_modified: Option<SystemTime>,
    force: bool,
    last_failure: SystemTime,
) -> bool {
    let Some(output_modified) = output_modified else {
        return true;
    };

    let changed_since_failure = last_failure < src_modified;
    if force && changed_since_failure {
        return true;
    }
    output_modified < src_modified && changed_since_failure
}
