pub mod config;
pub mod context;
pub mod error;
pub mod exclusion;
pub mod gather;
pub mod paths;
pub mod patterns;
pub mod recency;
pub mod tree;
pub mod vcs;

pub use config::{ConfigFile, DEFAULT_CONFIG_FILENAME, OptionOverrides, PackOptions};
pub use context::{DocumentAssembler, PackedDocument, RunSummary};
pub use error::{AppError, Result};
pub use gather::{FileContent, read_file_content, walk_files};
pub use patterns::{IncludeMatcher, matches_include_patterns};
pub use recency::{DEFAULT_RECENT_DAYS, RecencySet};
pub use tree::render_tree;
pub use vcs::{GitProvider, RepoInfo, VcsProvider};
