// src/lib.rs

pub mod cli;
pub mod compile;
pub mod config;
pub mod errors;
pub mod logging;
pub mod source;
pub mod supervisor;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cli::{CliArgs, Command};
use crate::compile::{BatchReport, BatchRunner, Compiler};
use crate::config::{default_config_path, load_from_path, load_or_default, ConfigFile, RawConfigFile};
use crate::errors::{LesswatchError, Result};
use crate::source::{list_files, render_tree, FileSetPatterns, SourceUnit};
use crate::supervisor::{spawn_poller, spawn_run_loop, Supervisor};
use crate::types::WatchMode;
use crate::watch::run_session;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - the batch runner (`compile`)
/// - the poller, or the watch session with optional restart supervisor
///   (`watch`)
/// - import tree printing (`tree`)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    log_config(&cfg);

    if cfg.skip {
        info!("Skipping execution per configuration");
        return Ok(());
    }

    match args.command {
        Command::Compile => compile_once(&cfg).map(|_| ()),
        Command::Watch => watch(cfg).await,
        Command::Tree => print_tree(&cfg),
    }
}

/// Load the config file (explicit `--config`, or `Lesswatch.toml` if it
/// exists) and apply CLI overrides before validation.
pub fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => load_or_default(default_config_path())?,
    };
    apply_overrides(&mut raw, args);
    ConfigFile::try_from(raw)
}

fn apply_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(dir) = &args.source_dir {
        raw.source_directory = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        raw.output_directory = dir.clone();
    }
    raw.compiler.compress |= args.compress;
    raw.force |= args.force;
    raw.watch.follow_delete |= args.follow_delete;
    raw.skip |= args.skip;
}

fn log_config(cfg: &ConfigFile) {
    info!("sourceDirectory = {:?}", cfg.source_directory);
    info!("outputDirectory = {:?}", cfg.output_directory);
    debug!(includes = ?cfg.includes, excludes = ?cfg.excludes, "file set patterns");
    debug!(
        force = cfg.force,
        skip = cfg.skip,
        backend = ?cfg.compiler.backend,
        less_js = ?cfg.compiler.less_js,
        "compiler settings"
    );
}

/// One batch pass over the configured file set.
pub fn compile_once(cfg: &ConfigFile) -> Result<BatchReport> {
    let patterns = FileSetPatterns::new(&cfg.includes, &cfg.excludes)?;
    let files = list_files(&cfg.source_directory, &patterns)?;
    if files.is_empty() {
        info!("Nothing to compile - no LESS sources found");
        return Ok(BatchReport::default());
    }
    debug!(?files, "included files");

    let compiler = Arc::new(Compiler::from_config(cfg));
    BatchRunner::new(compiler, cfg.force, true).run_once(&files)
}

async fn watch(cfg: ConfigFile) -> Result<()> {
    let cfg = Arc::new(cfg);
    let compiler = Arc::new(Compiler::from_config(&cfg));

    match cfg.watch.mode {
        WatchMode::Poll => {
            if cfg.force {
                info!("Disabled the 'force' flag in watch mode.");
            }
            let patterns = FileSetPatterns::new(&cfg.includes, &cfg.excludes)?;
            let runner = BatchRunner::new(compiler, false, false);
            let pass_cfg = Arc::clone(&cfg);

            let poller = spawn_poller(cfg.watch.interval(), move || {
                let files = list_files(&pass_cfg.source_directory, &patterns)?;
                runner.run_once(&files)
            });

            wait_for_ctrl_c().await;
            poller.stop().await;
            Ok(())
        }
        WatchMode::Events if cfg.watch.in_thread => {
            let supervisor = Supervisor::new(cfg.watch.restart_interval());
            let session_cfg = Arc::clone(&cfg);

            tokio::select! {
                res = supervisor.supervise(move || run_session(&session_cfg, Arc::clone(&compiler))) => res,
                _ = wait_for_ctrl_c() => Ok(()),
            }
        }
        WatchMode::Events => {
            let session_cfg = Arc::clone(&cfg);
            let done = spawn_run_loop("lesswatch-watch".to_string(), move || {
                run_session(&session_cfg, compiler)
            })?;

            tokio::select! {
                res = done => res.map_err(|e| LesswatchError::Other(e.into()))?,
                _ = wait_for_ctrl_c() => Ok(()),
            }
        }
    }
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Print every resolved source with its import tree.
fn print_tree(cfg: &ConfigFile) -> Result<()> {
    let patterns = FileSetPatterns::new(&cfg.includes, &cfg.excludes)?;
    let files = list_files(&cfg.source_directory, &patterns)?;
    if files.is_empty() {
        println!("No less sources found");
        return Ok(());
    }

    println!("The following less sources have been resolved:");
    for file in files {
        let unit = SourceUnit::load(&cfg.source_directory, &file)?;
        for line in render_tree(&unit) {
            println!("{line}");
        }
    }
    Ok(())
}
