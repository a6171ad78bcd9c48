use crate::error::{AppError, Result};
use crate::exclusion::is_excluded_entry;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MAX_CONTENT_BYTES: u64 = 16 * 1024;

/// Text of one file as it will be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Decoded content, with the truncation notice appended when the file
    /// was cut short.
    pub text: String,
    /// `'\n'` count + 1 over the decoded (possibly truncated) buffer, so an
    /// empty file reports one line.
    pub line_count: usize,
    /// Size on disk in bytes.
    pub size: u64,
    pub truncated: bool,
}

/// Lazily yields every non-excluded file below `root`.
///
/// Excluded directories are pruned without being entered. The root itself is
/// never tested against the exclusion policy, so walking `.` works. A
/// directory that cannot be listed yields one `Err` and the walk carries on
/// with its siblings.
pub fn walk_files(root: &Path) -> impl Iterator<Item = Result<PathBuf>> + use<> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !is_excluded_entry(&entry.file_name().to_string_lossy())
        })
        .filter_map(|entry_result| match entry_result {
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) => Some(Ok(entry.into_path())),
            Err(e) => Some(Err(AppError::from(e))),
        })
}

/// Reads `path` for rendering. Returns `None` on any failure (missing,
/// unreadable, not UTF-8); callers drop the file without counting it.
pub fn read_file_content(path: &Path) -> Option<FileContent> {
    match try_read_file_content(path) {
        Ok(content) => content,
        Err(e) => {
            log::debug!("Skipping unreadable file {}: {}", path.display(), e);
            None
        }
    }
}

fn try_read_file_content(path: &Path) -> Result<Option<FileContent>> {
    let size = fs::metadata(path)?.len();

    if size > MAX_CONTENT_BYTES {
        let mut buffer = Vec::with_capacity(MAX_CONTENT_BYTES as usize);
        File::open(path)?
            .take(MAX_CONTENT_BYTES)
            .read_to_end(&mut buffer)?;

        let Some(content) = decode_truncated(buffer) else {
            log::debug!("Skipping non-UTF-8 file: {}", path.display());
            return Ok(None);
        };
        let line_count = count_lines(&content);
        let text = format!(
            "{}\n\n File truncated: only first 16KB of {} bytes included.\n",
            content, size
        );
        return Ok(Some(FileContent {
            text,
            line_count,
            size,
            truncated: true,
        }));
    }

    let bytes = fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(Some(FileContent {
            line_count: count_lines(&text),
            size,
            text,
            truncated: false,
        })),
        Err(e) => {
            log::debug!("Skipping non-UTF-8 file: {} ({})", path.display(), e);
            Ok(None)
        }
    }
}

/// Strict UTF-8, except that a character split by the truncation point is
/// replaced rather than rejecting the whole file.
fn decode_truncated(buffer: Vec<u8>) -> Option<String> {
    match String::from_utf8(buffer) {
        Ok(text) => Some(text),
        Err(e) if e.utf8_error().error_len().is_none() => {
            Some(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
        Err(_) => None,
    }
}

pub fn count_lines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count() + 1
}
