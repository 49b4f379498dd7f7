// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile, FILE_NAME_PLACEHOLDER};
use crate::errors::{LesswatchError, Result};
use crate::types::BackendKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LesswatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_patterns(cfg)?;
    validate_output_format(cfg)?;
    validate_compiler(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    if cfg.includes.is_empty() {
        return Err(LesswatchError::config(
            "`includes` must contain at least one pattern",
        ));
    }

    for pat in cfg.includes.iter().chain(cfg.excludes.iter()) {
        Glob::new(pat).map_err(|e| {
            LesswatchError::config(format!("invalid glob pattern '{pat}': {e}"))
        })?;
    }
    Ok(())
}

fn validate_output_format(cfg: &RawConfigFile) -> Result<()> {
    if let Some(format) = &cfg.output_file_format {
        if !format.contains(FILE_NAME_PLACEHOLDER) {
            return Err(LesswatchError::config(format!(
                "`output_file_format` must contain {FILE_NAME_PLACEHOLDER} (got '{format}')"
            )));
        }
    }
    Ok(())
}

fn validate_compiler(cfg: &RawConfigFile) -> Result<()> {
    if !is_utf8_label(&cfg.compiler.encoding) {
        return Err(LesswatchError::config(format!(
            "[compiler].encoding '{}' is not supported; lessc always writes UTF-8",
            cfg.compiler.encoding
        )));
    }

    if cfg.compiler.backend == BackendKind::Node {
        match &cfg.compiler.less_js {
            None => {
                return Err(LesswatchError::config(
                    "[compiler].backend = \"node\" requires [compiler].less_js",
                ));
            }
            Some(path) if !path.is_file() => {
                return Err(LesswatchError::config(format!(
                    "error while loading LESS JavaScript: {:?} does not exist",
                    path
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.interval_ms == 0 {
        return Err(LesswatchError::config(
            "[watch].interval_ms must be >= 1 (got 0)",
        ));
    }
    Ok(())
}

fn is_utf8_label(encoding: &str) -> bool {
    matches!(
        encoding.trim().to_ascii_lowercase().as_str(),
        "utf-8" | "utf8"
    )
}
