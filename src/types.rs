use serde::Deserialize;

/// Which external compiler invocation style to use.
///
/// - `Lessc`: run the `lessc` executable (or a custom one) directly.
/// - `Node`: run `node <less_js> ...`, i.e. a custom LESS runtime script
///   under a JavaScript executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Lessc,
    Node,
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::Lessc
    }
}

/// How `lesswatch watch` notices changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchMode {
    /// Filesystem notifications (`notify`), optionally under the restart
    /// supervisor.
    Events,
    /// Re-run the batch pass every `interval_ms`.
    Poll,
}

impl Default for WatchMode {
    fn default() -> Self {
        WatchMode::Events
    }
}

/// What a watch-triggered *create* event does for a tracked source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// Always compile on create, like on modify.
    Always,
    /// Only compile when the output does not exist yet.
    IfOutputMissing,
}

impl Default for CreatePolicy {
    fn default() -> Self {
        CreatePolicy::Always
    }
}
