// src/watch/path_utils.rs

use std::path::Path;

/// `path` relative to `root` as a forward-slash string, the form the
/// tracked file set uses.
///
/// Falls back to comparing canonical paths when the plain prefix does not
/// match (symlinked temp dirs, `/private/var` vs `/var` on macOS). Returns
/// `None` for paths outside `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
