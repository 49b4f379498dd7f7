// src/watch/session.rs

use std::sync::Arc;
use std::sync::mpsc;

use notify::{RecommendedWatcher, Watcher};
use tracing::info;

use crate::compile::{BatchReport, BatchRunner, Compiler};
use crate::config::ConfigFile;
use crate::errors::{LesswatchError, Result};
use crate::source::{list_files, FileSetPatterns};
use crate::watch::engine::{WatchEngine, WatchOptions};

/// One complete event-driven watch session: resolve the file set, put the
/// source tree under watch, run an initial batch pass, then handle events
/// until something fatal happens.
///
/// Blocks the calling thread. Returns `Ok(())` only when there is nothing
/// to watch.
pub fn run_session(cfg: &ConfigFile, compiler: Arc<Compiler>) -> Result<()> {
    let patterns = FileSetPatterns::new(&cfg.includes, &cfg.excludes)?;
    let files = list_files(&cfg.source_directory, &patterns)?;
    if files.is_empty() {
        info!("Nothing to compile - no LESS sources found");
        return Ok(());
    }

    let (tx, rx) = mpsc::channel();
    let watcher = RecommendedWatcher::new(tx, notify::Config::default()).map_err(|source| {
        LesswatchError::WatchRegistration {
            path: cfg.source_directory.clone(),
            source,
        }
    })?;

    let options = WatchOptions {
        follow_delete: cfg.watch.follow_delete,
        on_create: cfg.watch.on_create,
    };
    let mut engine = WatchEngine::new(
        &cfg.source_directory,
        files.iter().cloned(),
        Arc::clone(&compiler),
        watcher,
        options,
    );
    engine.register_all()?;

    initial_pass(cfg, &compiler, &files)?;
    engine.run(rx)
}

/// Batch pass run before a session starts handling events.
///
/// `force` applies to the first session only; after that, and for every
/// event, it is off.
pub fn initial_pass(
    cfg: &ConfigFile,
    compiler: &Arc<Compiler>,
    files: &[String],
) -> Result<BatchReport> {
    let force = compiler.claim_initial_force(cfg.force);
    let report = BatchRunner::new(Arc::clone(compiler), force, false).run_once(files)?;
    if cfg.force {
        info!("Disabled the 'force' flag in watch mode.");
    }
    Ok(report)
}
