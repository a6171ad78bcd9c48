//! Unconditional skip rules shared by the tree renderer and the walker.

pub const DEPENDENCY_DIRS: &[&str] = &["node_modules"];
pub const VCS_METADATA_DIRS: &[&str] = &[".git", ".hg", ".svn"];
pub const LOCK_FILES: &[&str] = &["package-lock.json", "yarn.lock", "pnpm-lock.yaml"];

/// True for entries that are never listed nor visited: dependency and
/// version-control directories, and anything hidden.
pub fn is_excluded_entry(name: &str) -> bool {
    name.starts_with('.') || DEPENDENCY_DIRS.contains(&name) || VCS_METADATA_DIRS.contains(&name)
}

/// True for files that are listed in the tree but never rendered as content.
pub fn is_excluded_content(name: &str) -> bool {
    is_excluded_entry(name) || LOCK_FILES.contains(&name)
}
