// src/compile/mod.rs

//! Change detection and compilation.
//!
//! - [`detector`] decides whether a source needs compiling from mtimes and
//!   the last recorded failure.
//! - [`output`] maps source paths to output paths.
//! - [`backend`] invokes the external LESS compiler.
//! - [`driver`] ties these together for a single source.
//! - [`batch`] runs the driver over a whole file set.

pub mod backend;
pub mod batch;
pub mod context;
pub mod detector;
pub mod driver;
pub mod output;

pub use backend::{
    backend_from_config, CompileBackend, CompileFailure, CompileOptions, CompileRequest,
    Diagnostic, LesscBackend, NodeBackend,
};
pub use batch::{BatchReport, BatchRunner};
pub use context::{BuildContext, NoopBuildContext};
pub use detector::{needs_compile, CompileTarget};
pub use driver::{CompileError, CompileSettings, Compiler, FileOutcome, RunState};
pub use output::output_relative_path;
