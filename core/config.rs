use crate::error::{AppError, Result};
use crate::patterns::split_pattern_list;
use crate::recency::DEFAULT_RECENT_DAYS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = ".repo-packager-config.toml";

/// Project-local defaults read from `.repo-packager-config.toml`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub include: Option<IncludeSetting>,
    #[serde(default)]
    pub recent: Option<RecentSetting>,
    #[serde(default, alias = "line-numbers")]
    pub line_numbers: Option<bool>,
}

/// `include = "*.js,*.md"` or `include = ["*.js", "*.md"]`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum IncludeSetting {
    List(Vec<String>),
    Joined(String),
}

/// `recent = 14`, or `recent = true` for the default window.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecentSetting {
    Days(u32),
    Enabled(bool),
}

impl IncludeSetting {
    pub fn patterns(&self) -> Vec<String> {
        match self {
            IncludeSetting::Joined(raw) => split_pattern_list(raw),
            IncludeSetting::List(list) => list
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

impl RecentSetting {
    pub fn days(self) -> Option<u32> {
        match self {
            RecentSetting::Days(days) => Some(days),
            RecentSetting::Enabled(true) => Some(DEFAULT_RECENT_DAYS),
            RecentSetting::Enabled(false) => None,
        }
    }
}

impl ConfigFile {
    /// Finds the config file to load, if any.
    ///
    /// An explicitly named file must exist; the default file in
    /// `working_dir` is optional.
    pub fn resolve_config_path(
        working_dir: &Path,
        cli_config_file: Option<&Path>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p) => {
                let expanded = shellexpand::tilde(&p.to_string_lossy()).into_owned();
                let path = working_dir.join(expanded);
                if !path.is_file() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = working_dir.join(DEFAULT_CONFIG_FILENAME);
                if default_path.is_file() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!("No config file found at: {}", default_path.display());
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str::<ConfigFile>(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing TOML config file '{}': {}",
                config_path.display(),
                e
            ))
        })
    }

    /// Resolves and loads in one step; no file means all defaults.
    pub fn load(
        working_dir: &Path,
        cli_config_file: Option<&Path>,
        cli_disable_config: bool,
    ) -> Result<Self> {
        match Self::resolve_config_path(working_dir, cli_config_file, cli_disable_config)? {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output
            .as_deref()
            .map(|raw| PathBuf::from(shellexpand::tilde(raw).as_ref()))
    }
}

/// Values given explicitly on the command line. `None` (or `false` for the
/// line-number switch) defers to the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub output: Option<PathBuf>,
    pub include: Option<String>,
    pub recent_days: Option<u32>,
    pub line_numbers: bool,
}

/// Options for one packaging run, built once and handed to the assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackOptions {
    pub output: Option<PathBuf>,
    /// `None` means no include filtering; never `Some(empty)`.
    pub include_patterns: Option<Vec<String>>,
    /// `None` means the recency filter is off.
    pub recent_days: Option<u32>,
    pub line_numbers: bool,
}

impl PackOptions {
    pub fn resolve(file: &ConfigFile, overrides: OptionOverrides) -> Self {
        let include_patterns = match overrides.include.as_deref() {
            Some(raw) => split_pattern_list(raw),
            None => file
                .include
                .as_ref()
                .map(IncludeSetting::patterns)
                .unwrap_or_default(),
        };

        let options = Self {
            output: overrides.output.or_else(|| file.output_path()),
            include_patterns: Some(include_patterns).filter(|p| !p.is_empty()),
            recent_days: overrides
                .recent_days
                .or_else(|| file.recent.and_then(RecentSetting::days)),
            line_numbers: overrides.line_numbers || file.line_numbers.unwrap_or(false),
        };
        log::trace!("Resolved pack options: {:?}", options);
        options
    }
}
