#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use lesswatch::compile::{CompileSettings, Compiler};
use lesswatch::config::{ConfigFile, RawConfigFile};
use lesswatch::types::CreatePolicy;

use crate::fake_backend::FakeBackend;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfigFile,
    custom_includes: bool,
}

impl ConfigBuilder {
    pub fn new(source_dir: &Path, output_dir: &Path) -> Self {
        let mut config = RawConfigFile::default();
        config.source_directory = source_dir.to_path_buf();
        config.output_directory = output_dir.to_path_buf();
        Self {
            config,
            custom_includes: false,
        }
    }

    /// First call replaces the default `**/*.less` include.
    pub fn include(mut self, pattern: &str) -> Self {
        if !self.custom_includes {
            self.config.includes.clear();
            self.custom_includes = true;
        }
        self.config.includes.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.excludes.push(pattern.to_string());
        self
    }

    pub fn compress(mut self, val: bool) -> Self {
        self.config.compiler.compress = val;
        self
    }

    pub fn force(mut self, val: bool) -> Self {
        self.config.force = val;
        self
    }

    pub fn output_file_format(mut self, format: &str) -> Self {
        self.config.output_file_format = Some(format.to_string());
        self
    }

    pub fn follow_delete(mut self, val: bool) -> Self {
        self.config.watch.follow_delete = val;
        self
    }

    pub fn on_create(mut self, policy: CreatePolicy) -> Self {
        self.config.watch.on_create = policy;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// Compiler for `cfg` that uses `backend` instead of a real `lessc`.
pub fn fake_compiler(cfg: &ConfigFile, backend: &FakeBackend) -> Arc<Compiler> {
    Arc::new(Compiler::new(CompileSettings::from(cfg), backend.boxed()))
}
