// src/source/mod.rs

//! Source discovery.
//!
//! - [`resolver`] turns include/exclude globs into the ordered list of
//!   relative source paths.
//! - [`imports`] parses `@import` statements and builds the transitive
//!   import graph of a source.
//! - [`tree`] renders that graph for `lesswatch tree`.

pub mod imports;
pub mod resolver;
pub mod tree;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::Result;

pub use imports::{parse_imports, ImportGraph, ImportRef};
pub use resolver::{list_files, list_files_matching, FileSetPatterns};
pub use tree::render_tree;

/// One LESS source plus everything it transitively imports.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    relative: String,
    path: PathBuf,
    imports: ImportGraph,
}

impl SourceUnit {
    /// Load `relative` (forward-slash path under `source_dir`) and scan its
    /// imports.
    pub fn load(source_dir: &Path, relative: &str) -> Result<Self> {
        let path = source_dir.join(relative);
        let imports = ImportGraph::scan(&path)?;
        Ok(Self {
            relative: relative.to_string(),
            path,
            imports,
        })
    }

    pub fn relative(&self) -> &str {
        &self.relative
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn imports(&self) -> &ImportGraph {
        &self.imports
    }

    /// `max(mtime(source), mtime(every transitive import))`.
    pub fn last_modified_including_imports(&self) -> Result<SystemTime> {
        self.imports.last_modified()
    }
}
