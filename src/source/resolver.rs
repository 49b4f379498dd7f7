// src/source/resolver.rs

use std::fs;
use std::path::Path;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::errors::Result;

/// Compiled include/exclude patterns for the source tree.
///
/// Patterns are evaluated against paths relative to the source directory,
/// with forward slashes (e.g. `"theme/main.less"`).
#[derive(Debug, Clone)]
pub struct FileSetPatterns {
    include_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl FileSetPatterns {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        let include_set = build_globset(includes).context("building include globset")?;
        let exclude_set = if excludes.is_empty() {
            None
        } else {
            Some(build_globset(excludes).context("building exclude globset")?)
        };
        Ok(Self {
            include_set,
            exclude_set,
        })
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// List the source files under `root` matching the patterns, as relative
/// forward-slash paths in sorted order.
///
/// A missing `root` yields an empty list.
pub fn list_files(root: &Path, patterns: &FileSetPatterns) -> Result<Vec<String>> {
    if !root.is_dir() {
        warn!(?root, "source directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if patterns.matches(&rel_str) {
                        files.push(rel_str);
                    }
                }
            }
        }
    }

    files.sort();
    debug!(count = files.len(), "resolved source files");
    Ok(files)
}

/// Convenience wrapper compiling `includes`/`excludes` on the fly.
pub fn list_files_matching(
    root: &Path,
    includes: &[String],
    excludes: &[String],
) -> Result<Vec<String>> {
    let patterns = FileSetPatterns::new(includes, excludes)?;
    list_files(root, &patterns)
}
