//! Indented directory tree for the structure block.

use crate::error::{AppError, Result};
use crate::exclusion::is_excluded_entry;
use std::fs;
use std::path::Path;

/// Renders every non-excluded entry below `dir_path`, one per line.
///
/// Directories carry a trailing `/`, and each nesting level adds two spaces
/// to `indent`. Entries appear in directory-listing order. Failing to list
/// `dir_path` itself is an error; a nested directory that cannot be listed
/// is shown without children and logged.
pub fn render_tree(dir_path: &Path, indent: &str) -> Result<String> {
    let mut output = String::new();
    walk_tree(dir_path, indent, &mut output)?;
    Ok(output)
}

fn walk_tree(current_path: &Path, prefix: &str, output: &mut String) -> Result<()> {
    let entries = fs::read_dir(current_path).map_err(|e| AppError::FileRead {
        path: current_path.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if is_excluded_entry(&name) {
            log::trace!("Tree skipping excluded entry: {}", name);
            continue;
        }

        let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
        if is_dir {
            output.push_str(&format!("{}{}/\n", prefix, name));
            if let Err(e) = walk_tree(&entry.path(), &format!("{}  ", prefix), output) {
                log::warn!("Could not list {}: {}", entry.path().display(), e);
            }
        } else {
            output.push_str(&format!("{}{}\n", prefix, name));
        }
    }
    Ok(())
}
