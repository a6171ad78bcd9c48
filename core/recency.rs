//! Files touched by recent commits.

use crate::error::{AppError, Result};
use crate::paths::comparable_path;
use crate::vcs::VcsProvider;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_RECENT_DAYS: u32 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecencySet {
    days: u32,
    files: HashSet<PathBuf>,
}

impl RecencySet {
    /// Unions the files touched by every commit made on or after
    /// `today - days`, rooted at the repository enclosing `repo_root`.
    ///
    /// Fails with [`AppError::NotARepository`] when `repo_root` is not inside
    /// a working tree. A commit whose file list cannot be read is skipped.
    pub fn compute(
        vcs: &dyn VcsProvider,
        repo_root: &Path,
        days: u32,
        today: NaiveDate,
    ) -> Result<Self> {
        if !vcs.is_repository(repo_root) {
            return Err(AppError::NotARepository {
                path: repo_root.to_path_buf(),
            });
        }
        let work_tree = vcs.work_tree(repo_root)?;
        let since = cutoff_date(today, days);
        log::info!("Collecting files changed since {} ({} days)", since, days);

        let mut files = HashSet::new();
        for commit_id in vcs.commits_since(repo_root, since)? {
            match vcs.files_changed_in(repo_root, &commit_id) {
                Ok(changed) => {
                    for rel in changed {
                        files.insert(comparable_path(&work_tree, &rel));
                    }
                }
                Err(e) => {
                    log::debug!("Skipping commit {}: {}", commit_id, e);
                }
            }
        }
        log::debug!("Recency set holds {} files", files.len());
        Ok(Self { days, files })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Membership test on canonical paths; `base` resolves a relative `path`.
    pub fn contains(&self, base: &Path, path: &Path) -> bool {
        self.files.contains(&comparable_path(base, path))
    }
}

/// `today - days`, clamped to the earliest representable date so that an
/// oversized window simply admits every commit.
pub fn cutoff_date(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}
