//! Assembly of the packed repository document.
//!
//! One run walks the sections in a fixed order: location, git info, the
//! optional recency notice, structure, file contents and summary. Every
//! section is built in memory, so a fatal error leaves nothing behind.

use crate::config::PackOptions;
use crate::error::Result;
use crate::exclusion::is_excluded_content;
use crate::gather::{self, FileContent};
use crate::paths::{absolutize, display_relative};
use crate::patterns::IncludeMatcher;
use crate::recency::RecencySet;
use crate::tree::render_tree;
use crate::vcs::{NOT_A_REPOSITORY_NOTICE, VcsProvider};
use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Counters accumulated over the files that made it into the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_files: usize,
    pub total_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedDocument {
    pub text: String,
    pub summary: RunSummary,
    /// Size of the recency set, when the filter was active.
    pub recent_files_found: Option<usize>,
}

pub struct DocumentAssembler<'a> {
    options: &'a PackOptions,
    vcs: &'a dyn VcsProvider,
    working_dir: PathBuf,
    today: NaiveDate,
}

/// A file that passed every filter, read and ready to render.
struct RenderedFile {
    relative_path: String,
    extension: String,
    content: FileContent,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(options: &'a PackOptions, vcs: &'a dyn VcsProvider, working_dir: &Path) -> Self {
        Self {
            options,
            vcs,
            working_dir: working_dir.to_path_buf(),
            today: Utc::now().date_naive(),
        }
    }

    /// Pins the date the recency window is measured back from.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn assemble(&self, paths: &[PathBuf]) -> Result<PackedDocument> {
        let include = match &self.options.include_patterns {
            Some(patterns) if !patterns.is_empty() => Some(IncludeMatcher::new(patterns)?),
            _ => None,
        };
        let inputs: Vec<PathBuf> = paths
            .iter()
            .map(|p| absolutize(&self.working_dir, p))
            .collect();
        log::debug!("Packaging {} input path(s)", inputs.len());

        let mut parts: Vec<String> = Vec::new();
        parts.push("# Repository Context\n".to_string());

        parts.push("## File System Location\n".to_string());
        let locations: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        parts.push(format!("{}\n", locations.join("\n")));

        parts.push("## Git Info\n".to_string());
        let repo_path = self.repo_root(&inputs);
        let git_info = match self.vcs.repo_info(&repo_path) {
            Ok(info) => info.to_string(),
            Err(e) => {
                log::debug!("No repository info for {}: {}", repo_path.display(), e);
                NOT_A_REPOSITORY_NOTICE.to_string()
            }
        };
        parts.push(format!("{}\n", git_info));

        let recency = match self.options.recent_days {
            Some(days) => {
                let set = RecencySet::compute(self.vcs, &repo_path, days, self.today)?;
                parts.push("## Recent Changes Filter\n".to_string());
                parts.push(format!(
                    "- Filtering files modified within the last {} days\n",
                    days
                ));
                parts.push(format!("- Found {} recently modified files\n\n", set.len()));
                Some(set)
            }
            None => None,
        };

        parts.extend(self.structure_section(&inputs));

        parts.push(match &recency {
            Some(set) => format!(
                "## File Contents (Recent Changes - Last {} Days)",
                set.days()
            ),
            None => "## File Contents".to_string(),
        });

        let mut summary = RunSummary::default();
        for input in &inputs {
            for file in self.collect_files(input, recency.as_ref(), include.as_ref()) {
                summary.total_files += 1;
                summary.total_lines += file.content.line_count;
                parts.push(format!(
                    "\n### File: {} ({} bytes)",
                    file.relative_path, file.content.size
                ));
                parts.push(format!("```{}\n", file.extension));
                parts.push(if self.options.line_numbers {
                    number_lines(&file.content)
                } else {
                    file.content.text
                });
                parts.push("\n```\n".to_string());
            }
        }

        parts.push("\n## Summary\n".to_string());
        match &recency {
            Some(set) => {
                parts.push(format!("- Recent changes filter: Last {} days\n", set.days()));
                parts.push(format!(
                    "- Total recent files processed: {}\n",
                    summary.total_files
                ));
                parts.push(format!(
                    "- Total lines in recent files: {}\n",
                    summary.total_lines
                ));
            }
            None => {
                parts.push(format!("- Total files: {}\n", summary.total_files));
                parts.push(format!("- Total lines: {}\n", summary.total_lines));
            }
        }

        log::info!(
            "Packed {} files ({} lines)",
            summary.total_files,
            summary.total_lines
        );
        Ok(PackedDocument {
            text: parts.join("\n"),
            summary,
            recent_files_found: recency.as_ref().map(RecencySet::len),
        })
    }

    /// First input, or its parent directory when it names a file.
    fn repo_root(&self, inputs: &[PathBuf]) -> PathBuf {
        match inputs.first() {
            Some(first) if first.is_file() => first
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| first.clone()),
            Some(first) => first.clone(),
            None => self.working_dir.clone(),
        }
    }

    fn structure_section(&self, inputs: &[PathBuf]) -> Vec<String> {
        let mut parts = vec!["## Structure\n```".to_string()];
        let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();

        for input in inputs {
            if input.is_dir() {
                match render_tree(input, "  ") {
                    Ok(tree) => parts.push(tree),
                    Err(e) => log::warn!("Could not list {}: {}", input.display(), e),
                }
            } else if input.exists() {
                let folder = input
                    .parent()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let file = input
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                grouped.entry(folder).or_default().push(file);
            } else {
                log::warn!("Path not found: {}", input.display());
            }
        }

        for (folder, files) in grouped {
            parts.push(format!("{}/", folder));
            parts.extend(files.into_iter().map(|f| format!("  {}", f)));
        }
        parts.push("```\n".to_string());
        parts
    }

    /// Filters and reads the files under one input path, in walk order.
    fn collect_files(
        &self,
        input: &Path,
        recency: Option<&RecencySet>,
        include: Option<&IncludeMatcher>,
    ) -> Vec<RenderedFile> {
        let candidates: Vec<PathBuf> = if input.is_file() {
            vec![input.to_path_buf()]
        } else if input.is_dir() {
            gather::walk_files(input)
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        log::warn!("Skipping unreadable entry under {}: {}", input.display(), e);
                        None
                    }
                })
                .collect()
        } else {
            return Vec::new();
        };

        let selected: Vec<(PathBuf, String)> = candidates
            .into_iter()
            .filter_map(|path| {
                let relative = display_relative(&self.working_dir, &path);
                self.passes_filters(&path, &relative, recency, include)
                    .then_some((path, relative))
            })
            .collect();

        let contents: Vec<Option<FileContent>> = selected
            .par_iter()
            .map(|(path, _)| gather::read_file_content(path))
            .collect();

        selected
            .into_iter()
            .zip(contents)
            .filter_map(|((path, relative_path), content)| {
                let content = content?;
                let extension = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default();
                Some(RenderedFile {
                    relative_path,
                    extension,
                    content,
                })
            })
            .collect()
    }

    fn passes_filters(
        &self,
        path: &Path,
        relative: &str,
        recency: Option<&RecencySet>,
        include: Option<&IncludeMatcher>,
    ) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if is_excluded_content(&name) {
            log::trace!("Excluded by policy: {}", relative);
            return false;
        }
        if let Some(set) = recency {
            if !set.contains(&self.working_dir, path) {
                log::trace!("Not recently modified: {}", relative);
                return false;
            }
        }
        if let Some(matcher) = include {
            if !matcher.matches(relative) {
                log::trace!("No include pattern matched: {}", relative);
                return false;
            }
        }
        true
    }
}

/// Prefixes each content line with its right-aligned number. Anything past
/// `line_count` (the truncation notice) is left as is.
fn number_lines(content: &FileContent) -> String {
    let width = content.line_count.to_string().len();
    content
        .text
        .split('\n')
        .enumerate()
        .map(|(idx, line)| {
            if idx < content.line_count {
                format!("{:>width$} | {}", idx + 1, line, width = width)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str, line_count: usize) -> FileContent {
        FileContent {
            text: text.to_string(),
            line_count,
            size: text.len() as u64,
            truncated: false,
        }
    }

    #[test]
    fn numbers_are_right_aligned() {
        let text = (1..=10).map(|i| format!("l{}", i)).collect::<Vec<_>>().join("\n");
        let numbered = number_lines(&content(&text, 10));
        let lines: Vec<&str> = numbered.split('\n').collect();
        assert_eq!(lines[0], " 1 | l1");
        assert_eq!(lines[9], "10 | l10");
    }

    #[test]
    fn truncation_notice_is_not_numbered() {
        let text = "a\nb\n\n File truncated: only first 16KB of 99999 bytes included.\n";
        let numbered = number_lines(&content(text, 2));
        assert_eq!(
            numbered,
            "1 | a\n2 | b\n\n File truncated: only first 16KB of 99999 bytes included.\n"
        );
    }

    #[test]
    fn empty_file_gets_single_number() {
        assert_eq!(number_lines(&content("", 1)), "1 | ");
    }
}
