// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{BackendKind, CreatePolicy, WatchMode};

/// Placeholder substituted with the source stem in `output_file_format`.
pub const FILE_NAME_PLACEHOLDER: &str = "{fileName}";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// source_directory = "src/main/less"
/// output_directory = "target/style"
/// includes = ["**/*.less"]
/// excludes = ["**/_*.less"]
/// output_file_format = "{fileName}-bundle"
///
/// [compiler]
/// compress = true
///
/// [watch]
/// follow_delete = true
/// in_thread = true
/// ```
///
/// Every key is optional. This is the unchecked form; use
/// [`ConfigFile::try_from`] to validate it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Directory containing the LESS sources.
    #[serde(default = "default_source_directory")]
    pub source_directory: PathBuf,

    /// Directory receiving the compiled stylesheets.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Glob patterns, relative to `source_directory`, of files to compile.
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,

    /// Glob patterns, relative to `source_directory`, of files to leave out.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Skip every command (handy from CI profiles).
    #[serde(default)]
    pub skip: bool,

    /// Compile even when the output looks up to date. The failure guard
    /// still applies.
    #[serde(default)]
    pub force: bool,

    /// Output file name template, e.g. `"{fileName}-min"`.
    #[serde(default)]
    pub output_file_format: Option<String>,

    #[serde(default)]
    pub compiler: CompilerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

fn default_source_directory() -> PathBuf {
    PathBuf::from("src/main/less")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("target/style")
}

fn default_includes() -> Vec<String> {
    vec!["**/*.less".to_string()]
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            source_directory: default_source_directory(),
            output_directory: default_output_directory(),
            includes: default_includes(),
            excludes: Vec::new(),
            skip: false,
            force: false,
            output_file_format: None,
            compiler: CompilerSection::default(),
            watch: WatchSection::default(),
        }
    }
}

impl RawConfigFile {
    /// Anchor relative directories at `base` (usually the config file's
    /// parent directory).
    pub fn resolve_relative_to(&mut self, base: &Path) {
        self.source_directory = anchor(base, &self.source_directory);
        self.output_directory = anchor(base, &self.output_directory);
        if let Some(less_js) = self.compiler.less_js.take() {
            self.compiler.less_js = Some(anchor(base, &less_js));
        }
    }
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `[compiler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerSection {
    #[serde(default)]
    pub backend: BackendKind,

    /// Emit `.min.css` files compressed by the compiler.
    #[serde(default)]
    pub compress: bool,

    /// Character encoding of the written stylesheets.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Custom executable; defaults to `lessc` or `node` depending on the
    /// backend.
    #[serde(default)]
    pub executable: Option<String>,

    /// Location of a custom `less.js` / `lessc` script for the `node` backend.
    #[serde(default)]
    pub less_js: Option<PathBuf>,

    /// Extra arguments passed through to the compiler.
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            compress: false,
            encoding: default_encoding(),
            executable: None,
            less_js: None,
            args: Vec::new(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    #[serde(default)]
    pub mode: WatchMode,

    /// Poll interval for `mode = "poll"`.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Cooldown before the supervisor restarts a dead watch session.
    #[serde(default = "default_restart_interval_ms")]
    pub restart_interval_ms: u64,

    /// Delete the compiled stylesheet when its source is deleted.
    #[serde(default)]
    pub follow_delete: bool,

    /// Run the watch session on a background thread under the restart
    /// supervisor.
    #[serde(default)]
    pub in_thread: bool,

    #[serde(default)]
    pub on_create: CreatePolicy,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_restart_interval_ms() -> u64 {
    1000
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            mode: WatchMode::default(),
            interval_ms: default_interval_ms(),
            restart_interval_ms: default_restart_interval_ms(),
            follow_delete: false,
            in_thread: false,
            on_create: CreatePolicy::default(),
        }
    }
}

impl WatchSection {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn restart_interval(&self) -> Duration {
        Duration::from_millis(self.restart_interval_ms)
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can rely on the patterns compiling, the template containing
/// `{fileName}` and the encoding being supported.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub skip: bool,
    pub force: bool,
    pub output_file_format: Option<String>,
    pub compiler: CompilerSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            source_directory: raw.source_directory,
            output_directory: raw.output_directory,
            includes: raw.includes,
            excludes: raw.excludes,
            skip: raw.skip,
            force: raw.force,
            output_file_format: raw.output_file_format,
            compiler: raw.compiler,
            watch: raw.watch,
        }
    }
}
