// src/compile/driver.rs

//! Compile driver: maps a source to its output and invokes the backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::compile::backend::{
    backend_from_config, CompileBackend, CompileFailure, CompileOptions, CompileRequest,
};
use crate::compile::context::{BuildContext, NoopBuildContext};
use crate::compile::detector::{needs_compile, CompileTarget};
use crate::compile::output::output_relative_path;
use crate::config::ConfigFile;
use crate::errors::{LesswatchError, Result};
use crate::source::SourceUnit;

/// A source that failed to compile. The batch carries on with the next file.
#[derive(Debug, Error)]
#[error("error while compiling LESS source {path}: {failure}")]
pub struct CompileError {
    /// Source path relative to the source directory.
    pub path: String,
    #[source]
    pub failure: CompileFailure,
}

/// Result of handling one source.
#[derive(Debug)]
pub enum FileOutcome {
    Compiled { elapsed: Duration },
    /// Output is up to date (or the source is still broken and unchanged).
    Bypassed,
    Failed(CompileError),
}

impl FileOutcome {
    pub fn is_compiled(&self) -> bool {
        matches!(self, FileOutcome::Compiled { .. })
    }
}

/// Mutable state kept across compilations for the whole process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    /// Newest source mtime of the most recent failed compilation. Sources not
    /// modified after this point are not retried.
    pub last_failure: SystemTime,
    /// Set once the first watch session has run its initial pass.
    pub initial_pass_done: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            last_failure: SystemTime::UNIX_EPOCH,
            initial_pass_done: false,
        }
    }
}

/// Everything the driver needs from the configuration.
#[derive(Debug, Clone)]
pub struct CompileSettings {
    pub source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub output_file_format: Option<String>,
    pub options: CompileOptions,
}

impl From<&ConfigFile> for CompileSettings {
    fn from(cfg: &ConfigFile) -> Self {
        Self {
            source_directory: cfg.source_directory.clone(),
            output_directory: cfg.output_directory.clone(),
            output_file_format: cfg.output_file_format.clone(),
            options: CompileOptions::from(&cfg.compiler),
        }
    }
}

/// Compiler handle built once from configuration and shared (via `Arc`) by
/// the batch runner, the watch engine and every restarted watch session.
///
/// `RunState` sits behind a mutex; in practice only one run loop calls in at
/// a time.
pub struct Compiler {
    settings: CompileSettings,
    backend: Box<dyn CompileBackend>,
    build_context: Arc<dyn BuildContext>,
    state: Mutex<RunState>,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("settings", &self.settings)
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

impl Compiler {
    pub fn new(settings: CompileSettings, backend: Box<dyn CompileBackend>) -> Self {
        Self {
            settings,
            backend,
            build_context: Arc::new(NoopBuildContext),
            state: Mutex::new(RunState::default()),
        }
    }

    /// Compiler with the backend selected by `[compiler]`.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(CompileSettings::from(cfg), backend_from_config(&cfg.compiler))
    }

    pub fn with_build_context(mut self, build_context: Arc<dyn BuildContext>) -> Self {
        self.build_context = build_context;
        self
    }

    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    pub fn run_state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `force` for the initial pass of a watch session.
    ///
    /// Only the first session of the process may force; sessions restarted
    /// by the supervisor get `false`.
    pub fn claim_initial_force(&self, force: bool) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let first = !state.initial_pass_done;
        state.initial_pass_done = true;
        force && first
    }

    /// Absolute output path for a relative source path.
    pub fn output_path_for(&self, relative: &str) -> PathBuf {
        let rel_out = output_relative_path(
            relative,
            self.settings.output_file_format.as_deref(),
            self.settings.options.compress,
        );
        self.settings.output_directory.join(rel_out)
    }

    /// Compile `relative` only if the change detector says so.
    ///
    /// The output directory is created before anything else is checked.
    /// Per-file problems come back as `FileOutcome::Failed`; only
    /// configuration errors (e.g. an output directory that cannot be
    /// created) are returned as `Err`.
    pub fn compile_if_changed(&self, relative: &str, force: bool) -> Result<FileOutcome> {
        let output = self.output_path_for(relative);
        let (unit, src_modified) = match self.prepare(relative) {
            Ok(prepared) => prepared,
            Err(failure) => return Ok(self.failed(relative, failure)),
        };

        ensure_parent_dir(&output)?;
        let target = match CompileTarget::probe(&output) {
            Ok(t) => t,
            Err(err) => return Ok(self.failed(relative, err.into())),
        };

        let last_failure = self.run_state().last_failure;
        if !needs_compile(src_modified, target.modified, force, last_failure) {
            return Ok(FileOutcome::Bypassed);
        }

        self.attempt(&unit, src_modified, &output)
    }

    /// Compile `relative` unconditionally (used for watch events, where the
    /// event itself is the change signal).
    pub fn compile(&self, relative: &str) -> Result<FileOutcome> {
        let output = self.output_path_for(relative);
        match self.prepare(relative) {
            Ok((unit, src_modified)) => self.attempt(&unit, src_modified, &output),
            Err(failure) => Ok(self.failed(relative, failure)),
        }
    }

    fn prepare(&self, relative: &str) -> std::result::Result<(SourceUnit, SystemTime), CompileFailure> {
        let input = self.settings.source_directory.join(relative);
        self.build_context.remove_messages(&input);

        let unit = SourceUnit::load(&self.settings.source_directory, relative)
            .map_err(into_failure)?;
        let src_modified = unit.last_modified_including_imports().map_err(into_failure)?;
        debug!(file = %relative, imports = unit.imports().files().len() - 1, "loaded source");
        Ok((unit, src_modified))
    }

    fn attempt(
        &self,
        unit: &SourceUnit,
        src_modified: SystemTime,
        output: &Path,
    ) -> Result<FileOutcome> {
        ensure_parent_dir(output)?;

        info!(file = %unit.relative(), "Compiling LESS source");
        let started = Instant::now();

        let request = CompileRequest {
            source: unit.path(),
            output,
            options: &self.settings.options,
        };

        match self.backend.compile(&request) {
            Ok(()) => {
                self.build_context.refresh(output);
                let elapsed = started.elapsed();
                info!(
                    file = %unit.relative(),
                    "Finished compilation to {:?} in {} ms",
                    self.settings.output_directory,
                    elapsed.as_millis()
                );
                Ok(FileOutcome::Compiled { elapsed })
            }
            Err(failure) => {
                self.state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .last_failure = src_modified;
                Ok(self.failed(unit.relative(), failure))
            }
        }
    }

    fn failed(&self, relative: &str, failure: CompileFailure) -> FileOutcome {
        let err = CompileError {
            path: relative.to_string(),
            failure,
        };
        error!(backend = self.backend.name(), "{err}");
        FileOutcome::Failed(err)
    }
}

fn ensure_parent_dir(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|err| {
                LesswatchError::config(format!(
                    "Cannot create output directory {:?}: {err}",
                    parent
                ))
            })?;
        }
    }
    Ok(())
}

fn into_failure(err: LesswatchError) -> CompileFailure {
    match err {
        LesswatchError::IoError(io) => CompileFailure::Io(io),
        other => CompileFailure::Io(std::io::Error::other(other.to_string())),
    }
}
