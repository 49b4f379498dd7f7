// src/watch/engine.rs

//! Event-driven recompilation.
//!
//! The engine alternates between two states:
//! - idle: blocked on the next filesystem event,
//! - draining: processing that event plus everything already queued behind
//!   it.
//!
//! It never returns on its own under normal operation; the only exits are
//! session-fatal errors (watch registration, output deletion, closed event
//! stream), which the supervisor turns into a restart.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use tracing::{debug, info, warn};

use crate::compile::{Compiler, FileOutcome};
use crate::errors::{LesswatchError, Result};
use crate::types::CreatePolicy;
use crate::watch::events::{coalesce, FsEvent, FsEventKind};
use crate::watch::path_utils::relative_str;
use crate::watch::registry::{DirWatcher, WatchRegistry};

/// Watch-mode behaviour switches from `[watch]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    pub follow_delete: bool,
    pub on_create: CreatePolicy,
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A new directory (and its subdirectories) is now watched.
    WatchedDirectory(PathBuf),
    Compiled(String),
    CompileFailed(String),
    /// The output of a deleted source was removed.
    DeletedOutput(String),
    /// Untracked path, nothing to delete, or suppressed by the create policy.
    Ignored,
}

impl EventOutcome {
    fn changed_outputs(&self) -> bool {
        matches!(self, EventOutcome::Compiled(_) | EventOutcome::DeletedOutput(_))
    }
}

pub struct WatchEngine<W: DirWatcher> {
    source_dir: PathBuf,
    tracked: HashSet<String>,
    compiler: Arc<Compiler>,
    registry: WatchRegistry<W>,
    options: WatchOptions,
}

impl<W: DirWatcher> std::fmt::Debug for WatchEngine<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchEngine")
            .field("source_dir", &self.source_dir)
            .field("tracked", &self.tracked.len())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<W: DirWatcher> WatchEngine<W> {
    /// `files` are the relative source paths tracked for this session.
    pub fn new(
        source_dir: &Path,
        files: impl IntoIterator<Item = String>,
        compiler: Arc<Compiler>,
        watcher: W,
        options: WatchOptions,
    ) -> Self {
        // Canonicalize once so registered paths (and the event paths derived
        // from them) share one stable prefix.
        let source_dir = source_dir
            .canonicalize()
            .unwrap_or_else(|_| source_dir.to_path_buf());

        Self {
            source_dir,
            tracked: files.into_iter().collect(),
            compiler,
            registry: WatchRegistry::new(watcher),
            options,
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn registry(&self) -> &WatchRegistry<W> {
        &self.registry
    }

    /// Watch the source directory and every directory below it.
    pub fn register_all(&mut self) -> Result<usize> {
        let source_dir = self.source_dir.clone();
        let added = self.registry.register_tree(&source_dir)?;
        info!(dirs = added, "Watching {:?}", source_dir);
        Ok(added)
    }

    /// Block on `events` forever, draining and handling batches.
    ///
    /// Returns `Err(WatchClosed)` once the sender side is gone, or any
    /// session-fatal error from handling an event.
    pub fn run(mut self, events: Receiver<notify::Result<notify::Event>>) -> Result<()> {
        let mut announce = true;

        loop {
            if announce {
                info!("Waiting for changes...");
                announce = false;
            }

            let first = events.recv().map_err(|_| LesswatchError::WatchClosed)?;
            let mut pending = vec![first];
            pending.extend(events.try_iter());

            let batch: Vec<FsEvent> = pending
                .into_iter()
                .filter_map(|res| match res {
                    Ok(event) => Some(event),
                    Err(err) => {
                        warn!(error = %err, "file watch error");
                        None
                    }
                })
                .flat_map(FsEvent::from_notify)
                .collect();

            let outcomes = self.drain(batch)?;
            if outcomes.iter().any(EventOutcome::changed_outputs) {
                announce = true;
            }
        }
    }

    /// Handle one batch of events in order, skipping exact repeats.
    pub fn drain(&mut self, batch: Vec<FsEvent>) -> Result<Vec<EventOutcome>> {
        let batch = coalesce(batch);
        debug!(events = batch.len(), "draining filesystem events");

        let mut outcomes = Vec::with_capacity(batch.len());
        for event in &batch {
            outcomes.push(self.handle_event(event)?);
        }
        Ok(outcomes)
    }

    pub fn handle_event(&mut self, event: &FsEvent) -> Result<EventOutcome> {
        debug!(kind = ?event.kind, path = ?event.path, "watched event");

        if event.path.is_dir() {
            if event.kind == FsEventKind::Create {
                self.registry.register_tree(&event.path)?;
                return Ok(EventOutcome::WatchedDirectory(event.path.clone()));
            }
            return Ok(EventOutcome::Ignored);
        }

        let Some(rel) = relative_str(&self.source_dir, &event.path) else {
            return Ok(EventOutcome::Ignored);
        };
        if !self.tracked.contains(&rel) {
            return Ok(EventOutcome::Ignored);
        }

        match event.kind {
            FsEventKind::Delete => self.handle_delete(rel),
            FsEventKind::Create => {
                if self.options.on_create == CreatePolicy::IfOutputMissing
                    && self.compiler.output_path_for(&rel).exists()
                {
                    debug!(file = %rel, "output already exists; not compiling on create");
                    return Ok(EventOutcome::Ignored);
                }
                self.compile(rel)
            }
            FsEventKind::Modify => self.compile(rel),
        }
    }

    fn compile(&self, rel: String) -> Result<EventOutcome> {
        Ok(match self.compiler.compile(&rel)? {
            FileOutcome::Compiled { .. } => EventOutcome::Compiled(rel),
            FileOutcome::Failed(_) => EventOutcome::CompileFailed(rel),
            FileOutcome::Bypassed => EventOutcome::Ignored,
        })
    }

    fn handle_delete(&self, rel: String) -> Result<EventOutcome> {
        if !self.options.follow_delete {
            return Ok(EventOutcome::Ignored);
        }

        let output = self.compiler.output_path_for(&rel);
        match fs::remove_file(&output) {
            Ok(()) => {
                info!(file = %rel, "deleted {:?}", output);
                Ok(EventOutcome::DeletedOutput(rel))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(EventOutcome::Ignored),
            Err(err) => Err(err.into()),
        }
    }
}
