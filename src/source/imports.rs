// src/source/imports.rs

//! `@import` discovery and the per-source import graph.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use regex::Regex;
use tracing::{debug, warn};

use crate::errors::Result;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s*(?:\(([^)]*)\)\s*)?(?:url\(\s*)?["']([^"']+)["']"#)
        .expect("import regex is valid")
});

/// A single `@import` statement as written in a LESS source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    /// The quoted path, e.g. `"mixins/colors"`.
    pub spec: String,
    /// Import options, e.g. `reference` in `@import (reference) "x";`.
    pub options: Vec<String>,
}

impl ImportRef {
    fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|o| o == name)
    }

    /// Whether the compiler will read this file as part of the source, i.e.
    /// whether its modification time matters.
    pub fn is_followed(&self) -> bool {
        if self.spec.contains("://") || self.spec.starts_with("//") {
            return false;
        }
        if self.has_option("css") {
            return false;
        }
        if self.spec.ends_with(".css") {
            return self.has_option("less") || self.has_option("inline");
        }
        true
    }

    /// Location of the imported file relative to the importing file's
    /// directory. `.less` is appended unless the import already ends in
    /// `.less` or `.css` (`theme.v2` -> `theme.v2.less`).
    pub fn resolve(&self, importer_dir: &Path) -> PathBuf {
        let path = importer_dir.join(&self.spec);
        match path.extension().and_then(|e| e.to_str()) {
            Some("less" | "css") => path,
            _ => {
                let mut name = path.into_os_string();
                name.push(".less");
                PathBuf::from(name)
            }
        }
    }
}

/// Extract all `@import` statements from LESS source text, skipping
/// commented-out ones.
pub fn parse_imports(contents: &str) -> Vec<ImportRef> {
    let stripped = strip_comments(contents);

    IMPORT_RE
        .captures_iter(&stripped)
        .map(|caps| {
            let options = caps
                .get(1)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(|o| o.trim().to_lowercase())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            ImportRef {
                spec: caps[2].to_string(),
                options,
            }
        })
        .collect()
}

/// Remove `/* */` and `//` comments. String literals and unquoted
/// `url(...)` bodies are copied untouched, so `"http://..."` survives.
fn strip_comments(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    let mut chars = contents.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' | '\'' => {
                out.push(c);
                while let Some((_, n)) = chars.next() {
                    out.push(n);
                    if n == '\\' {
                        if let Some((_, escaped)) = chars.next() {
                            out.push(escaped);
                        }
                    } else if n == c {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                for (_, n) in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, n) in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            'u' if contents[i..].starts_with("url(") => {
                out.push(c);
                for (_, n) in chars.by_ref() {
                    out.push(n);
                    if n == ')' {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Transitive import graph of one source file.
///
/// Nodes are files, edges point from importer to imported file and carry the
/// import spec as written. Cycles are kept as edges; traversal visits every
/// file once.
#[derive(Debug, Clone)]
pub struct ImportGraph {
    graph: DiGraph<PathBuf, String>,
    root: NodeIndex,
}

impl ImportGraph {
    /// Parse `entry` and everything it imports, recursively.
    ///
    /// The entry itself must be readable. Imports that do not exist on disk
    /// are logged and left out of the graph; the compiler reports them.
    pub fn scan(entry: &Path) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut seen: HashMap<PathBuf, NodeIndex> = HashMap::new();

        let root = graph.add_node(entry.to_path_buf());
        seen.insert(node_key(entry), root);

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let file = graph[node].clone();
            let contents = match fs::read_to_string(&file) {
                Ok(c) => c,
                Err(err) if node == root => return Err(err.into()),
                Err(err) => {
                    warn!(file = ?file, error = %err, "cannot read imported file");
                    continue;
                }
            };

            let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
            for import in parse_imports(&contents) {
                if !import.is_followed() {
                    debug!(importer = ?file, spec = %import.spec, "not following import");
                    continue;
                }

                let target = import.resolve(&dir);
                if !target.is_file() {
                    warn!(importer = ?file, spec = %import.spec, "imported file not found");
                    continue;
                }

                let key = node_key(&target);
                let child = match seen.get(&key) {
                    Some(&existing) => existing,
                    None => {
                        let idx = graph.add_node(target);
                        seen.insert(key, idx);
                        stack.push(idx);
                        idx
                    }
                };
                graph.add_edge(node, child, import.spec);
            }
        }

        Ok(Self { graph, root })
    }

    /// The entry file the graph was scanned from.
    pub fn root(&self) -> &Path {
        &self.graph[self.root]
    }

    /// Every file in the closure, entry first. Each file appears once even
    /// when imports are cyclic.
    pub fn files(&self) -> Vec<&Path> {
        let mut dfs = Dfs::new(&self.graph, self.root);
        let mut files = Vec::with_capacity(self.graph.node_count());
        while let Some(node) = dfs.next(&self.graph) {
            files.push(self.graph[node].as_path());
        }
        files
    }

    /// Most recent modification time across the entry and all its imports.
    pub fn last_modified(&self) -> Result<SystemTime> {
        let mut latest = SystemTime::UNIX_EPOCH;
        for file in self.files() {
            let modified = fs::metadata(file)?.modified()?;
            if modified > latest {
                latest = modified;
            }
        }
        Ok(latest)
    }

    pub(crate) fn root_index(&self) -> NodeIndex {
        self.root
    }

    /// Direct imports of `node` in source order, as (spec, target).
    pub(crate) fn direct_imports(&self, node: NodeIndex) -> Vec<(&str, NodeIndex)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.id(), e.weight().as_str(), e.target()))
            .collect();
        edges.sort_by_key(|(id, _, _)| *id);
        edges.into_iter().map(|(_, spec, target)| (spec, target)).collect()
    }
}

/// Identity of a file for cycle detection: canonical when possible.
fn node_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
