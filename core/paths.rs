use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolves `path` against `base` without touching the filesystem.
///
/// `.` components are dropped and `..` pops the previous component, so
/// `absolutize("/work", "src/../lib")` yields `/work/lib`. Symlinks are
/// left alone.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Canonical form when the path exists, otherwise the lexical absolute form.
pub fn comparable_path(base: &Path, path: &Path) -> PathBuf {
    let absolute = absolutize(base, path);
    fs::canonicalize(&absolute).unwrap_or(absolute)
}

/// Path of `path` relative to `base`, using `/` separators.
pub fn display_relative(base: &Path, path: &Path) -> String {
    let relative = pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf());
    let shown = relative.to_string_lossy().replace('\\', "/");
    if shown.is_empty() {
        ".".to_string()
    } else {
        shown
    }
}
