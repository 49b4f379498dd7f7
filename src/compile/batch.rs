// src/compile/batch.rs

//! One pass over the resolved file set.

use std::sync::Arc;

use tracing::{debug, info};

use crate::compile::driver::{CompileError, Compiler, FileOutcome};
use crate::errors::Result;

/// Per-file results of a batch pass.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub compiled: Vec<String>,
    pub bypassed: Vec<String>,
    pub failed: Vec<CompileError>,
}

impl BatchReport {
    pub fn compiled_count(&self) -> usize {
        self.compiled.len()
    }

    pub fn bypassed_count(&self) -> usize {
        self.bypassed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty() && self.bypassed.is_empty() && self.failed.is_empty()
    }

    /// Whether the pass wrote any output.
    pub fn changed_anything(&self) -> bool {
        !self.compiled.is_empty()
    }
}

/// Applies change detection + compilation to every file of a set.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    compiler: Arc<Compiler>,
    force: bool,
    announce_bypass: bool,
}

impl BatchRunner {
    /// `announce_bypass` controls whether up-to-date sources are logged at
    /// info (batch mode) or only at debug (watch mode).
    pub fn new(compiler: Arc<Compiler>, force: bool, announce_bypass: bool) -> Self {
        Self {
            compiler,
            force,
            announce_bypass,
        }
    }

    /// Process `files` in the given order.
    ///
    /// Individual compile failures are collected in the report and never
    /// stop the pass; only configuration errors abort it.
    pub fn run_once(&self, files: &[String]) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        if files.is_empty() {
            debug!("empty file set; nothing to do");
            return Ok(report);
        }

        for file in files {
            match self.compiler.compile_if_changed(file, self.force)? {
                FileOutcome::Compiled { .. } => report.compiled.push(file.clone()),
                FileOutcome::Bypassed => {
                    if self.announce_bypass {
                        info!(file = %file, "Bypassing LESS source (not modified)");
                    } else {
                        debug!(file = %file, "source not modified");
                    }
                    report.bypassed.push(file.clone());
                }
                FileOutcome::Failed(err) => report.failed.push(err),
            }
        }

        info!(
            compiled = report.compiled_count(),
            bypassed = report.bypassed_count(),
            failed = report.failed_count(),
            "batch finished"
        );
        Ok(report)
    }
}
