//! Version-control collaborator.
//!
//! The assembler only talks to [`VcsProvider`]; [`GitProvider`] is the
//! `git2`-backed implementation used by the CLI.

use crate::error::{AppError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use git2::{ErrorCode, Oid, Repository, Sort};
use indexmap::IndexSet;
use std::fmt;
use std::path::{Path, PathBuf};

pub const NOT_A_REPOSITORY_NOTICE: &str = "Not a git repository";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub commit_hash: String,
    pub branch: String,
    pub author_name: String,
    pub author_email: String,
    pub date: String,
}

impl fmt::Display for RepoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- Commit: {}\n- Branch: {}\n- Author: {} <{}>\n- Date: {}",
            self.commit_hash, self.branch, self.author_name, self.author_email, self.date
        )
    }
}

pub trait VcsProvider {
    /// Latest commit details for the repository enclosing `path`.
    fn repo_info(&self, path: &Path) -> Result<RepoInfo>;

    fn is_repository(&self, path: &Path) -> bool;

    /// Root of the working tree enclosing `path`.
    fn work_tree(&self, path: &Path) -> Result<PathBuf>;

    /// Ids of commits made on or after 00:00 UTC of `since`, newest first.
    fn commits_since(&self, path: &Path, since: NaiveDate) -> Result<Vec<String>>;

    /// Paths touched by `commit_id`, relative to the working tree.
    fn files_changed_in(&self, path: &Path, commit_id: &str) -> Result<Vec<PathBuf>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GitProvider;

impl GitProvider {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Result<Repository> {
        Repository::discover(path).map_err(|e| {
            log::trace!("Repository discovery failed for {}: {}", path.display(), e);
            AppError::NotARepository {
                path: path.to_path_buf(),
            }
        })
    }
}

impl VcsProvider for GitProvider {
    fn repo_info(&self, path: &Path) -> Result<RepoInfo> {
        let repo = Self::open(path)?;
        let head = repo.head()?;
        let commit = head.peel_to_commit()?;
        let branch = if repo.head_detached()? {
            "HEAD".to_string()
        } else {
            head.shorthand().unwrap_or("HEAD").to_string()
        };
        let author = commit.author();

        Ok(RepoInfo {
            commit_hash: commit.id().to_string(),
            branch,
            author_name: author.name().unwrap_or_default().to_string(),
            author_email: author.email().unwrap_or_default().to_string(),
            date: format_git_time(author.when()),
        })
    }

    fn is_repository(&self, path: &Path) -> bool {
        Repository::discover(path)
            .map(|repo| repo.workdir().is_some())
            .unwrap_or(false)
    }

    fn work_tree(&self, path: &Path) -> Result<PathBuf> {
        let repo = Self::open(path)?;
        repo.workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| AppError::NotARepository {
                path: path.to_path_buf(),
            })
    }

    fn commits_since(&self, path: &Path, since: NaiveDate) -> Result<Vec<String>> {
        let repo = Self::open(path)?;
        match repo.head() {
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                log::debug!("Repository at {} has no commits yet", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
            Ok(_) => {}
        }

        let cutoff = since
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp())
            .unwrap_or(i64::MIN);

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            if commit.time().seconds() >= cutoff {
                commits.push(commit.id().to_string());
            }
        }
        log::debug!("Found {} commits since {}", commits.len(), since);
        Ok(commits)
    }

    fn files_changed_in(&self, path: &Path, commit_id: &str) -> Result<Vec<PathBuf>> {
        let repo = Self::open(path)?;
        let commit = repo.find_commit(Oid::from_str(commit_id)?)?;
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let mut files = IndexSet::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(p) = file.path() {
                    files.insert(p.to_path_buf());
                }
            }
        }
        Ok(files.into_iter().collect())
    }
}

/// RFC 3339 rendering in the signature's own UTC offset.
fn format_git_time(time: git2::Time) -> String {
    FixedOffset::east_opt(time.offset_minutes() * 60)
        .zip(DateTime::from_timestamp(time.seconds(), 0))
        .map(|(offset, utc)| utc.with_timezone(&offset).to_rfc3339())
        .unwrap_or_else(|| time.seconds().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use git2::{Commit, Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    fn init_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).expect("init repo");
        repo.set_head("refs/heads/main").expect("set head");
        repo
    }

    fn commit_file(repo: &Repository, rel: &str, content: &str, when: i64) -> Oid {
        let workdir = repo.workdir().expect("workdir");
        let full = workdir.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&full, content).expect("write");

        let mut index = repo.index().expect("index");
        index.add_path(Path::new(rel)).expect("add path");
        index.write().expect("write index");
        let tree = repo.find_tree(index.write_tree().expect("write tree")).expect("tree");
        let sig = Signature::new("Test Author", "author@example.com", &Time::new(when, 120))
            .expect("signature");
        let parents: Vec<Commit> = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().expect("head commit")],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, &format!("update {}", rel), &tree, &parent_refs)
            .expect("commit")
    }

    #[test]
    fn plain_directory_is_not_a_repository() {
        let tmp = TempDir::new().expect("tmp dir");
        let provider = GitProvider::new();
        assert!(!provider.is_repository(tmp.path()));
        assert!(matches!(
            provider.repo_info(tmp.path()),
            Err(AppError::NotARepository { .. })
        ));
    }

    #[test]
    fn repo_info_reports_head_commit() {
        let tmp = TempDir::new().expect("tmp dir");
        let repo = init_repo(tmp.path());
        let oid = commit_file(&repo, "a.js", "let a = 1;", 1_700_000_000);

        let provider = GitProvider::new();
        assert!(provider.is_repository(tmp.path()));
        let info = provider.repo_info(tmp.path()).expect("info");
        assert_eq!(info.commit_hash, oid.to_string());
        assert_eq!(info.branch, "main");
        assert_eq!(info.author_name, "Test Author");
        assert_eq!(info.author_email, "author@example.com");
        assert_eq!(info.date, "2023-11-15T00:13:20+02:00");

        let rendered = info.to_string();
        assert!(rendered.starts_with(&format!("- Commit: {}\n", oid)));
        assert!(rendered.contains("- Author: Test Author <author@example.com>"));
    }

    #[test]
    fn unborn_repository_has_no_info_but_no_commits_either() {
        let tmp = TempDir::new().expect("tmp dir");
        init_repo(tmp.path());
        let provider = GitProvider::new();

        assert!(provider.is_repository(tmp.path()));
        assert!(provider.repo_info(tmp.path()).is_err());
        let since = Utc::now().date_naive();
        assert!(provider.commits_since(tmp.path(), since).expect("commits").is_empty());
    }

    #[test]
    fn commits_since_honours_day_cutoff() {
        let tmp = TempDir::new().expect("tmp dir");
        let repo = init_repo(tmp.path());
        let now = Utc::now();
        commit_file(&repo, "old.txt", "old", (now - Duration::days(10)).timestamp());
        let recent = commit_file(&repo, "new.txt", "new", (now - Duration::days(1)).timestamp());

        let provider = GitProvider::new();
        let since = now.date_naive() - Duration::days(3);
        let commits = provider.commits_since(tmp.path(), since).expect("commits");
        assert_eq!(commits, vec![recent.to_string()]);

        let since_all = now.date_naive() - Duration::days(30);
        assert_eq!(provider.commits_since(tmp.path(), since_all).expect("commits").len(), 2);
    }

    #[test]
    fn files_changed_in_lists_only_touched_paths() {
        let tmp = TempDir::new().expect("tmp dir");
        let repo = init_repo(tmp.path());
        let first = commit_file(&repo, "src/a.js", "a", 1_700_000_000);
        let second = commit_file(&repo, "docs/b.md", "b", 1_700_000_100);

        let provider = GitProvider::new();
        assert_eq!(
            provider.files_changed_in(tmp.path(), &first.to_string()).expect("files"),
            vec![PathBuf::from("src/a.js")]
        );
        assert_eq!(
            provider.files_changed_in(tmp.path(), &second.to_string()).expect("files"),
            vec![PathBuf::from("docs/b.md")]
        );
        assert!(provider.files_changed_in(tmp.path(), "not-a-hash").is_err());
    }

    #[test]
    fn work_tree_is_found_from_subdirectory() {
        let tmp = TempDir::new().expect("tmp dir");
        let repo = init_repo(tmp.path());
        commit_file(&repo, "src/lib.rs", "", 1_700_000_000);

        let provider = GitProvider::new();
        let root = provider.work_tree(&tmp.path().join("src")).expect("work tree");
        assert_eq!(
            fs::canonicalize(root).expect("canonical root"),
            fs::canonicalize(tmp.path()).expect("canonical tmp")
        );
    }
}
