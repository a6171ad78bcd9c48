//! Include-pattern matching with base-name semantics.
//!
//! A pattern without a `/` is matched against the file's base name, so
//! `*.js` selects JavaScript files at any depth. A pattern containing a
//! `/` is matched against the whole relative path.

use crate::error::{AppError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

#[derive(Debug, Clone)]
pub struct IncludeMatcher {
    patterns: Vec<String>,
    basename_set: GlobSet,
    path_set: GlobSet,
}

impl IncludeMatcher {
    /// Compiles `patterns`. An empty list is rejected: "no filtering" is the
    /// caller's decision and must never reach the matcher.
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(AppError::InvalidArgument(
                "include pattern set must not be empty".to_string(),
            ));
        }

        let mut basename_builder = GlobSetBuilder::new();
        let mut path_builder = GlobSetBuilder::new();
        for pattern_str in patterns {
            let processed = pattern_str.trim().trim_start_matches("./");
            let glob = GlobBuilder::new(processed)
                .literal_separator(true)
                .build()
                .map_err(|e| {
                    log::error!("Invalid glob pattern \"{}\": {}", pattern_str, e);
                    AppError::Glob(format!("Invalid glob pattern \"{}\": {}", pattern_str, e))
                })?;
            log::trace!("Adding include pattern: {}", processed);
            if processed.contains('/') {
                path_builder.add(glob);
            } else {
                basename_builder.add(glob);
            }
        }

        Ok(Self {
            patterns: patterns.to_vec(),
            basename_set: basename_builder.build()?,
            path_set: path_builder.build()?,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// True when any pattern matches `relative_path` (`/`-separated).
    pub fn matches(&self, relative_path: &str) -> bool {
        let relative_path = relative_path.trim_start_matches("./");
        if relative_path.is_empty() {
            return false;
        }
        let basename = relative_path.rsplit('/').next().unwrap_or(relative_path);
        self.basename_set.is_match(basename) || self.path_set.is_match(relative_path)
    }
}

/// One-shot form of [`IncludeMatcher::matches`]. An absent or empty pattern
/// set is an `InvalidArgument` error.
pub fn matches_include_patterns(relative_path: &str, patterns: Option<&[String]>) -> Result<bool> {
    let patterns = patterns.ok_or_else(|| {
        AppError::InvalidArgument("include pattern set must be provided".to_string())
    })?;
    Ok(IncludeMatcher::new(patterns)?.matches(relative_path))
}

/// Splits a comma-separated pattern list, trimming each entry and dropping
/// empty ones.
pub fn split_pattern_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn basename_patterns_match_at_any_depth() {
        let p = patterns(&["*.js", "*.md"]);
        assert!(matches_include_patterns("src/index.js", Some(p.as_slice())).unwrap());
        assert!(matches_include_patterns("README.md", Some(p.as_slice())).unwrap());
        assert!(!matches_include_patterns("src/lib.rs", Some(p.as_slice())).unwrap());
    }

    #[test]
    fn non_matching_patterns_return_false() {
        let p = patterns(&["*.md", "*.json"]);
        assert!(!matches_include_patterns("src/index.js", Some(p.as_slice())).unwrap());
    }

    #[test]
    fn path_patterns_match_full_relative_path() {
        let p = patterns(&["src/**/*.js"]);
        assert!(matches_include_patterns("src/utils/helper.js", Some(p.as_slice())).unwrap());
        assert!(matches_include_patterns("src/index.js", Some(p.as_slice())).unwrap());
        assert!(!matches_include_patterns("lib/utils/helper.js", Some(p.as_slice())).unwrap());

        let single = patterns(&["src/*.js"]);
        assert!(!matches_include_patterns("src/utils/helper.js", Some(single.as_slice())).unwrap());
    }

    #[test]
    fn empty_pattern_set_is_invalid_argument() {
        let empty: Vec<String> = Vec::new();
        let err = matches_include_patterns("src/index.js", Some(empty.as_slice())).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn absent_pattern_set_is_invalid_argument() {
        let err = matches_include_patterns("src/index.js", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn empty_path_never_matches() {
        let p = patterns(&["*.js"]);
        assert!(!matches_include_patterns("", Some(p.as_slice())).unwrap());
    }

    #[test]
    fn invalid_glob_is_reported() {
        let err = IncludeMatcher::new(&patterns(&["src/[unclosed"])).unwrap_err();
        assert!(matches!(err, AppError::Glob(_)));
    }

    #[test]
    fn split_pattern_list_trims_entries() {
        assert_eq!(split_pattern_list(" *.js , *.md,, "), patterns(&["*.js", "*.md"]));
        assert!(split_pattern_list(" , ").is_empty());
    }
}
