// src/compile/context.rs

//! Hook for an external incremental-build system.

use std::path::Path;

/// Notified around every compilation so an IDE or build tool can drop stale
/// error markers and pick up refreshed outputs.
pub trait BuildContext: Send + Sync {
    /// Called before compiling `source`.
    fn remove_messages(&self, source: &Path);

    /// Called after `output` was successfully written.
    fn refresh(&self, output: &Path);
}

/// Build context used when nothing external is listening.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBuildContext;

impl BuildContext for NoopBuildContext {
    fn remove_messages(&self, _source: &Path) {}

    fn refresh(&self, _output: &Path) {}
}
