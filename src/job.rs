//! Immutable run configuration.

use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default number of files above which the directory-scan strategy is used.
pub const DEFAULT_SCAN_THRESHOLD: usize = 2000;

/// A fully validated description of one sorting run.
///
/// A `SortJob` is built once (usually by [`crate::config::SortSettings::into_job`])
/// and handed to the [`crate::engine::CopyEngine`] by value, so nothing can
/// change it while a run is in progress.
#[derive(Debug, Clone)]
pub struct SortJob {
    /// Directory tree to read files from.
    pub source_root: PathBuf,
    /// Directory under which the per-extension folders are created.
    pub destination_root: PathBuf,
    /// Lowercase extensions including the leading dot. Empty means all files.
    pub extensions: HashSet<String>,
    /// Whether to descend into subdirectories of the source root.
    pub recursive: bool,
    /// Estimated file count above which the directory-scan strategy is used.
    pub scan_threshold: usize,
    /// Glob patterns; files matching any of them are filtered out.
    pub exclude_patterns: Vec<Pattern>,
    /// Resolve everything but leave the destination untouched.
    pub dry_run: bool,
}

impl SortJob {
    /// Creates a job copying every file from `source_root` into `destination_root`.
    ///
    /// Relative paths are made absolute against the current directory.
    pub fn new(source_root: impl AsRef<Path>, destination_root: impl AsRef<Path>) -> Self {
        Self {
            source_root: absolute(source_root.as_ref()),
            destination_root: absolute(destination_root.as_ref()),
            extensions: HashSet::new(),
            recursive: true,
            scan_threshold: DEFAULT_SCAN_THRESHOLD,
            exclude_patterns: Vec::new(),
            dry_run: false,
        }
    }

    /// Restricts the job to the given extensions, normalizing each entry.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_scan_threshold(mut self, scan_threshold: usize) -> Self {
        self.scan_threshold = scan_threshold;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<Pattern>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the allow-list sorted for display.
    pub fn sorted_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.extensions.iter().cloned().collect();
        extensions.sort();
        extensions
    }
}

/// Normalizes a user supplied extension to lowercase with a leading dot.
///
/// Returns `None` for entries that are empty after trimming.
///
/// # Examples
///
/// ```
/// use filesort::job::normalize_extension;
///
/// assert_eq!(normalize_extension("PDF"), Some(".pdf".to_string()));
/// assert_eq!(normalize_extension(" .Png "), Some(".png".to_string()));
/// assert_eq!(normalize_extension("  "), None);
/// ```
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
