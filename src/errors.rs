// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::compile::CompileError;

#[derive(Error, Debug)]
pub enum LesswatchError {
    /// Fatal setup problem: bad config value, output directory that cannot
    /// be created, missing custom runtime script.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A single source failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Cannot register filesystem watch on {path:?}: {source}")]
    WatchRegistration {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Filesystem event stream closed")]
    WatchClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LesswatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        LesswatchError::ConfigError(msg.into())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LesswatchError>;
