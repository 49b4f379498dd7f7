// src/compile/output.rs

use std::path::PathBuf;

use crate::config::FILE_NAME_PLACEHOLDER;

pub const CSS_SUFFIX: &str = ".css";
pub const MIN_CSS_SUFFIX: &str = ".min.css";

/// Map a relative source path to its relative output path.
///
/// The stem (path without the source extension) is substituted into
/// `template` when one is given, then the stylesheet suffix is appended:
///
/// - `a/b.less`, compress, no template -> `a/b.min.css`
/// - `a/b.less`, template `"{fileName}-out"` -> `a/b-out.css`
pub fn output_relative_path(relative: &str, template: Option<&str>, compress: bool) -> PathBuf {
    let stem = strip_extension(relative);
    let name = match template {
        Some(template) => template.replace(FILE_NAME_PLACEHOLDER, stem),
        None => stem.to_string(),
    };
    let suffix = if compress { MIN_CSS_SUFFIX } else { CSS_SUFFIX };
    PathBuf::from(format!("{name}{suffix}"))
}

// Only the extension of the last path segment is removed; dotfiles keep
// their name.
fn strip_extension(relative: &str) -> &str {
    let file_start = relative.rfind('/').map(|i| i + 1).unwrap_or(0);
    match relative[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &relative[..file_start + dot],
        _ => relative,
    }
}
