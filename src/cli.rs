// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `lesswatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lesswatch",
    version,
    about = "Compile LESS stylesheets incrementally and recompile on change.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the config file (TOML).
    ///
    /// Default: `Lesswatch.toml` in the current working directory, if present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LESSWATCH_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Override `source_directory`.
    #[arg(long, global = true, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Override `output_directory`.
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Compress the generated CSS (`.min.css` outputs).
    #[arg(long, global = true)]
    pub compress: bool,

    /// Compile even when outputs look up to date.
    #[arg(long, global = true)]
    pub force: bool,

    /// Delete outputs when their sources are deleted (watch mode).
    #[arg(long, global = true)]
    pub follow_delete: bool,

    /// Do nothing (same as `skip = true`).
    #[arg(long, global = true)]
    pub skip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Compile every changed source once.
    Compile,
    /// Compile, then keep recompiling as sources change.
    Watch,
    /// Print each source with its import tree.
    Tree,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
