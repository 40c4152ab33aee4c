//! Files discovered during traversal.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Folder name used for files without an extension.
pub const NO_EXTENSION_FOLDER: &str = "no_extension";

/// A regular file found under the source root.
///
/// Candidates are produced by a [`crate::traverser::FileEnumerator`] and
/// consumed exactly once by the copy engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Base name of the file.
    pub name: String,
    /// Lowercase final suffix including the dot, or empty.
    pub extension: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

impl FileCandidate {
    /// Builds a candidate by reading metadata for `path`, following symlinks.
    pub fn from_path(path: PathBuf) -> io::Result<Self> {
        let metadata = fs::metadata(&path)?;
        Ok(Self::from_metadata(path, &metadata))
    }

    /// Builds a candidate from metadata that was already fetched.
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = extension_of(&path);
        Self {
            path,
            name,
            extension,
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }

    /// Returns the destination folder name for this candidate.
    pub fn folder_name(&self) -> String {
        folder_name_for(&self.extension)
    }
}

/// Returns the lowercase final suffix of `path` including the dot.
///
/// Only the last suffix counts, so `archive.tar.gz` yields `.gz`. Dotfiles
/// such as `.bashrc` and names ending in a dot have no extension.
pub fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy().to_lowercase()),
        _ => String::new(),
    }
}

/// Maps an extension (with or without the dot) to its folder name.
///
/// # Examples
///
/// ```
/// use filesort::candidate::folder_name_for;
///
/// assert_eq!(folder_name_for(".gz"), "gz");
/// assert_eq!(folder_name_for(""), "no_extension");
/// ```
pub fn folder_name_for(extension: &str) -> String {
    let stripped = extension.trim_start_matches('.').to_lowercase();
    if stripped.is_empty() {
        NO_EXTENSION_FOLDER.to_string()
    } else {
        stripped
    }
}
