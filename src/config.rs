//! Run configuration loaded from TOML files.
//!
//! Every setting can come from a configuration file, from command-line flags,
//! or from the built-in defaults. Flags win over the file and the file wins
//! over the defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [sort]
//! source = "/home/me/Downloads"
//! destination = "/home/me/Sorted"
//! extensions = [".pdf", "png", "webp"]
//! recursive = true
//! scan_threshold = 2000
//! exclude_patterns = ["*.part", "**/node_modules/**"]
//! dry_run = false
//! ```

use crate::job::{DEFAULT_SCAN_THRESHOLD, SortJob};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading configuration or building a job.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// A required path was given neither in the file nor on the command line.
    MissingPath(&'static str),
    /// The scan threshold must be positive.
    InvalidThreshold(usize),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::MissingPath(name) => {
                write!(f, "No {} path given (set it in the config file or pass it as an argument)", name)
            }
            ConfigError::InvalidThreshold(value) => {
                write!(f, "Scan threshold must be a positive integer, got {}", value)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default)]
    pub sort: SortSettings,
}

/// Settings of a run before validation. Unset values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSettings {
    /// Directory tree to read from.
    #[serde(default)]
    pub source: Option<PathBuf>,

    /// Directory to create the per-extension folders in.
    #[serde(default)]
    pub destination: Option<PathBuf>,

    /// Extension allow-list (e.g. ".pdf" or "png"). Empty means all files.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Descend into subdirectories. Defaults to true.
    #[serde(default)]
    pub recursive: Option<bool>,

    /// File count above which the directory-scan strategy is used.
    #[serde(default)]
    pub scan_threshold: Option<usize>,

    /// Glob patterns for files to leave alone.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Report what would be copied without touching the destination.
    #[serde(default)]
    pub dry_run: Option<bool>,
}

impl SortConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.filesortrc.toml` in the current directory
    /// 3. Look for `~/.config/filesort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".filesortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("filesort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }
}

impl SortSettings {
    /// Layers `overrides` on top of `self`.
    ///
    /// Scalar values set in `overrides` replace ours; a non-empty list in
    /// `overrides` replaces our list.
    pub fn merge(self, overrides: SortSettings) -> SortSettings {
        SortSettings {
            source: overrides.source.or(self.source),
            destination: overrides.destination.or(self.destination),
            extensions: if overrides.extensions.is_empty() {
                self.extensions
            } else {
                overrides.extensions
            },
            recursive: overrides.recursive.or(self.recursive),
            scan_threshold: overrides.scan_threshold.or(self.scan_threshold),
            exclude_patterns: if overrides.exclude_patterns.is_empty() {
                self.exclude_patterns
            } else {
                overrides.exclude_patterns
            },
            dry_run: overrides.dry_run.or(self.dry_run),
        }
    }

    /// Validates the settings and builds an immutable [`SortJob`].
    ///
    /// # Errors
    ///
    /// Returns an error if a path is missing, the threshold is zero or a
    /// glob pattern does not compile.
    pub fn into_job(self) -> Result<SortJob, ConfigError> {
        let source = self.source.ok_or(ConfigError::MissingPath("source"))?;
        let destination = self
            .destination
            .ok_or(ConfigError::MissingPath("destination"))?;

        let scan_threshold = self.scan_threshold.unwrap_or(DEFAULT_SCAN_THRESHOLD);
        if scan_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(scan_threshold));
        }

        let exclude_patterns = self
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SortJob::new(source, destination)
            .with_extensions(&self.extensions)
            .with_recursive(self.recursive.unwrap_or(true))
            .with_scan_threshold(scan_threshold)
            .with_exclude_patterns(exclude_patterns)
            .with_dry_run(self.dry_run.unwrap_or(false)))
    }
}
