// src/compile/backend.rs

//! Pluggable compiler backend abstraction.
//!
//! The driver talks to a `CompileBackend` instead of spawning processes
//! itself, so tests can swap in a fake that records calls.
//!
//! - [`LesscBackend`] runs the `lessc` executable (or a custom one).
//! - [`NodeBackend`] runs a custom LESS runtime script under `node`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::config::CompilerSection;
use crate::types::BackendKind;

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"on line (\d+), column (\d+)").expect("location regex is valid")
});

/// Options handed to the backend for every compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub compress: bool,
    pub encoding: String,
    /// Custom LESS runtime script (`less_js`).
    pub custom_runtime: Option<PathBuf>,
    /// Custom executable name or path.
    pub custom_executable: Option<String>,
    pub args: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            compress: false,
            encoding: "utf-8".to_string(),
            custom_runtime: None,
            custom_executable: None,
            args: Vec::new(),
        }
    }
}

impl From<&CompilerSection> for CompileOptions {
    fn from(section: &CompilerSection) -> Self {
        Self {
            compress: section.compress,
            encoding: section.encoding.clone(),
            custom_runtime: section.less_js.clone(),
            custom_executable: section.executable.clone(),
            args: section.args.clone(),
        }
    }
}

/// One compilation: read `source`, write `output`.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    pub options: &'a CompileOptions,
}

/// Compiler-reported problem in a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "{} (line {line}, column {column})", self.message)
            }
            _ => f.write_str(&self.message),
        }
    }
}

impl Diagnostic {
    /// Build a diagnostic from compiler stderr: the first non-empty line is
    /// the message, `on line N, column M` gives the location.
    pub fn from_stderr(stderr: &str) -> Self {
        let message = stderr
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("compiler reported an error")
            .to_string();

        let (line, column) = match LOCATION_RE.captures(stderr) {
            Some(caps) => (caps[1].parse().ok(), caps[2].parse().ok()),
            None => (None, None),
        };

        Self {
            message,
            line,
            column,
        }
    }
}

/// Why a backend failed to produce the output.
#[derive(Debug, Error)]
pub enum CompileFailure {
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Diagnostic(Diagnostic),

    #[error("compiler process was interrupted")]
    Interrupted,
}

/// Trait abstracting how a single source gets compiled.
pub trait CompileBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn compile(&self, request: &CompileRequest<'_>) -> Result<(), CompileFailure>;
}

/// Runs `lessc [args] <source> <output>`.
#[derive(Debug, Clone)]
pub struct LesscBackend {
    program: String,
}

impl LesscBackend {
    pub const DEFAULT_PROGRAM: &'static str = "lessc";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for LesscBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl CompileBackend for LesscBackend {
    fn name(&self) -> &'static str {
        "lessc"
    }

    fn compile(&self, request: &CompileRequest<'_>) -> Result<(), CompileFailure> {
        let mut cmd = Command::new(&self.program);
        push_compiler_args(&mut cmd, request);
        run_compiler(cmd, &self.program)
    }
}

/// Runs `node <script> [args] <source> <output>`.
#[derive(Debug, Clone)]
pub struct NodeBackend {
    node: String,
    script: PathBuf,
}

impl NodeBackend {
    pub const DEFAULT_NODE: &'static str = "node";

    pub fn new(node: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            node: node.into(),
            script: script.into(),
        }
    }
}

impl CompileBackend for NodeBackend {
    fn name(&self) -> &'static str {
        "node"
    }

    fn compile(&self, request: &CompileRequest<'_>) -> Result<(), CompileFailure> {
        let mut cmd = Command::new(&self.node);
        cmd.arg(&self.script);
        push_compiler_args(&mut cmd, request);
        run_compiler(cmd, &self.node)
    }
}

/// Pick the backend configured in `[compiler]`.
///
/// Validation guarantees `less_js` is present for the node backend; if it is
/// missing anyway the lessc backend is used.
pub fn backend_from_config(section: &CompilerSection) -> Box<dyn CompileBackend> {
    match (section.backend, &section.less_js) {
        (BackendKind::Node, Some(script)) => Box::new(NodeBackend::new(
            section
                .executable
                .clone()
                .unwrap_or_else(|| NodeBackend::DEFAULT_NODE.to_string()),
            script.clone(),
        )),
        _ => Box::new(LesscBackend::new(
            section
                .executable
                .clone()
                .unwrap_or_else(|| LesscBackend::DEFAULT_PROGRAM.to_string()),
        )),
    }
}

fn push_compiler_args(cmd: &mut Command, request: &CompileRequest<'_>) {
    cmd.arg("--no-color");
    if request.options.compress {
        cmd.arg("--compress");
    }
    cmd.args(&request.options.args);
    cmd.arg(request.source).arg(request.output);
}

fn run_compiler(mut cmd: Command, program: &str) -> Result<(), CompileFailure> {
    debug!(?cmd, "invoking compiler");
    let output: Output = cmd.output().map_err(|err| {
        io::Error::new(err.kind(), format!("running compiler '{program}': {err}"))
    })?;

    if output.status.success() {
        return Ok(());
    }

    // No exit code means the process was killed by a signal.
    if output.status.code().is_none() {
        return Err(CompileFailure::Interrupted);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        stderr.into_owned()
    };
    Err(CompileFailure::Diagnostic(Diagnostic::from_stderr(&text)))
}
