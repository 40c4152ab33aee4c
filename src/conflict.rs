//! Destination conflict resolution.
//!
//! Decides whether a candidate can be copied to its proposed destination,
//! is already present there, or has to be copied under a numbered name.

use crate::candidate::FileCandidate;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Modification times closer than this are considered equal.
pub const MTIME_TOLERANCE: Duration = Duration::from_secs(1);

/// Outcome of resolving a proposed destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Copy to this path; nothing exists there yet.
    Proceed(PathBuf),
    /// An identical file already exists at this path.
    SkipIdentical(PathBuf),
}

/// Resolves name clashes in a destination folder.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Resolves `proposed` for `source`.
    ///
    /// 1. A free path is returned as is.
    /// 2. An occupied path holding a file with the same size and a
    ///    modification time within [`MTIME_TOLERANCE`] means the file was
    ///    already copied.
    /// 3. Otherwise `_1`, `_2`, ... is inserted before the extension until a
    ///    free name is found. A numbered name that already holds an identical
    ///    file also counts as already copied, so repeated runs stay idempotent.
    ///
    /// The counter has no upper bound; it stops at the first free name.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filesort::candidate::FileCandidate;
    /// use filesort::conflict::{ConflictResolver, Resolution};
    /// use std::path::PathBuf;
    ///
    /// let source = FileCandidate::from_path(PathBuf::from("/data/report.pdf")).unwrap();
    /// match ConflictResolver::resolve(&source, PathBuf::from("/sorted/pdf/report.pdf")) {
    ///     Resolution::Proceed(path) => println!("copy to {}", path.display()),
    ///     Resolution::SkipIdentical(path) => println!("already at {}", path.display()),
    /// }
    /// ```
    pub fn resolve(source: &FileCandidate, proposed: PathBuf) -> Resolution {
        if !is_occupied(&proposed) {
            return Resolution::Proceed(proposed);
        }
        if is_identical(source, &proposed) {
            return Resolution::SkipIdentical(proposed);
        }

        let folder = proposed
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let mut counter: u64 = 1;
        loop {
            let numbered = folder.join(numbered_name(&proposed, counter));
            if !is_occupied(&numbered) {
                return Resolution::Proceed(numbered);
            }
            if is_identical(source, &numbered) {
                return Resolution::SkipIdentical(numbered);
            }
            counter += 1;
        }
    }
}

/// Inserts `_<counter>` between the stem and the original-case extension.
///
/// `report.pdf` becomes `report_1.pdf`, `archive.tar.gz` becomes
/// `archive.tar_1.gz`, `README` becomes `README_1` and `trailing.`
/// becomes `trailing._1`.
pub fn numbered_name(path: &Path, counter: u64) -> String {
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => format!(
            "{}_{}.{}",
            stem.to_string_lossy(),
            counter,
            ext.to_string_lossy()
        ),
        // No suffix to keep: a trailing dot stays part of the name.
        _ => {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            format!("{}_{}", name, counter)
        }
    }
}

// Broken symlinks count as occupied so they are never written through.
fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Size and modification-time heuristic. An unreadable destination is
/// treated as a different file.
fn is_identical(source: &FileCandidate, existing: &Path) -> bool {
    let Ok(metadata) = fs::metadata(existing) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    metadata.is_file()
        && metadata.len() == source.size
        && mtime_delta(source.modified, modified) < MTIME_TOLERANCE
}

fn mtime_delta(a: SystemTime, b: SystemTime) -> Duration {
    a.duration_since(b)
        .unwrap_or_else(|err| err.duration())
}
