use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "repo-packager",
    author,
    version,
    about = "Package repository content for LLMs.",
    long_about = "repo-packager walks files and directories and writes a single Markdown document \nwith their location, git info, directory structure and file contents, ready to paste \ninto a language model prompt.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  repo-packager .\n  repo-packager src README.md -o context.md\n  repo-packager -i \"*.rs,*.toml\" -r 3"
)]
pub struct Cli {
    #[arg(
        value_name = "PATHS",
        help = "One or more files or directories to analyze [default: .]."
    )]
    pub paths: Vec<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout.",
        help_heading = "Output"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "PATTERNS",
        help = "Comma-separated glob patterns for files to include (e.g. \"*.js,*.md\").",
        help_heading = "Filtering"
    )]
    pub include: Option<String>,

    #[arg(
        short,
        long,
        value_name = "DAYS",
        num_args = 0..=1,
        help = "Only include files changed in commits from the last DAYS days [default: 7].",
        help_heading = "Filtering"
    )]
    pub recent: Option<Option<String>>,

    #[arg(
        short,
        long,
        help = "Prefix each content line with its line number.",
        help_heading = "Output"
    )]
    pub line_numbers: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "Read defaults from this TOML file (default: ./.repo-packager-config.toml).",
        conflicts_with = "no_config",
        help_heading = "Configuration"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        help = "Ignore any configuration file.",
        conflicts_with = "config",
        help_heading = "Configuration"
    )]
    pub no_config: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,
}

/// What `-r/--recent` asked for, after splitting a stray path off its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentRequest {
    pub days: u32,
    pub extra_path: Option<PathBuf>,
}

impl Cli {
    /// `None` when the flag was not given. A value that is not a day count
    /// falls back to 7 days and is treated as one more input path.
    pub fn recent_request(&self) -> Option<RecentRequest> {
        let value = self.recent.as_ref()?;
        let request = match value.as_deref().map(str::trim) {
            None => RecentRequest {
                days: repo_packager_core::DEFAULT_RECENT_DAYS,
                extra_path: None,
            },
            Some(raw) => match raw.parse::<u32>() {
                Ok(days) => RecentRequest {
                    days,
                    extra_path: None,
                },
                Err(_) => RecentRequest {
                    days: repo_packager_core::DEFAULT_RECENT_DAYS,
                    extra_path: Some(PathBuf::from(raw)),
                },
            },
        };
        Some(request)
    }

    /// Positional paths plus any path swallowed by `--recent`, or `.` when
    /// none were given.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.paths.clone();
        if let Some(extra) = self.recent_request().and_then(|r| r.extra_path) {
            paths.push(extra);
        }
        if paths.is_empty() {
            paths.push(PathBuf::from("."));
        }
        paths
    }
}
