//! Source tree enumeration.
//!
//! Two strategies produce the same files in the same order:
//! - [`WalkEnumerator`] does one exhaustive `walkdir` pass and is used for
//!   trees up to the scan threshold. The same walk backs the counting pass.
//! - [`ScanEnumerator`] reads one directory at a time from an explicit stack,
//!   which keeps peak memory bounded by the largest single directory.
//!
//! Both sort entries by file name and visit depth first, and both prune the
//! destination root so a destination nested in the source is never read.

use crate::cancel::CancelToken;
use crate::candidate::FileCandidate;
use serde::Serialize;
use std::fs::{self, DirEntry, FileType};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory or entry that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalError {
    pub path: PathBuf,
    pub message: String,
}

impl TraversalError {
    fn new(path: &Path, message: impl ToString) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    fn from_walkdir(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        let message = err
            .io_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| err.to_string());
        Self { path, message }
    }
}

impl std::fmt::Display for TraversalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not access {}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for TraversalError {}

/// One item of a traversal: a file, or a warning about something unreadable.
pub type TraversalItem = Result<FileCandidate, TraversalError>;

/// Lazy, single-pass sequence of traversal items.
pub type Traversal = Box<dyn Iterator<Item = TraversalItem>>;

/// Which enumeration strategy a run used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Walk,
    Scan,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Walk => write!(f, "single-pass walk"),
            Strategy::Scan => write!(f, "directory scan"),
        }
    }
}

/// Enumerates regular files below a root directory.
pub trait FileEnumerator {
    fn strategy(&self) -> Strategy;

    /// Starts a traversal of `root`. Only immediate children are visited
    /// when `recursive` is false.
    fn enumerate(&self, root: &Path, recursive: bool) -> Traversal;
}

/// Picks the directory scan when the estimate exceeds `threshold`.
pub fn select_enumerator(
    estimated: usize,
    threshold: usize,
    excluded: Option<PathBuf>,
) -> Box<dyn FileEnumerator> {
    if estimated > threshold {
        Box::new(ScanEnumerator::new(excluded))
    } else {
        Box::new(WalkEnumerator::new(excluded))
    }
}

/// Counts the files a traversal of `root` would yield.
///
/// Unreadable directories are silently left out of the estimate; the
/// processing pass reports them. Returns early with a partial count once
/// `cancel` is set.
pub fn estimate_file_count(
    root: &Path,
    recursive: bool,
    excluded: Option<&Path>,
    cancel: &CancelToken,
) -> usize {
    let mut count = 0;
    for entry in walker(root, recursive, excluded.map(Path::to_path_buf)).flatten() {
        if cancel.is_cancelled() {
            break;
        }
        if is_file_like(entry.path(), entry.file_type()) {
            count += 1;
        }
    }
    count
}

/// Exhaustive single-pass walk backed by `walkdir`.
#[derive(Debug, Clone, Default)]
pub struct WalkEnumerator {
    excluded: Option<PathBuf>,
}

impl WalkEnumerator {
    pub fn new(excluded: Option<PathBuf>) -> Self {
        Self { excluded }
    }
}

impl FileEnumerator for WalkEnumerator {
    fn strategy(&self) -> Strategy {
        Strategy::Walk
    }

    fn enumerate(&self, root: &Path, recursive: bool) -> Traversal {
        let entries = walker(root, recursive, self.excluded.clone());
        Box::new(entries.filter_map(|entry| match entry {
            Ok(entry) => candidate_from_entry(entry.path(), entry.file_type()),
            Err(err) => Some(Err(TraversalError::from_walkdir(err))),
        }))
    }
}

fn walker(
    root: &Path,
    recursive: bool,
    excluded: Option<PathBuf>,
) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> + use<> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| !is_excluded(entry.path(), excluded.as_deref()))
}

/// Directory-by-directory scan using `fs::read_dir`.
#[derive(Debug, Clone, Default)]
pub struct ScanEnumerator {
    excluded: Option<PathBuf>,
}

impl ScanEnumerator {
    pub fn new(excluded: Option<PathBuf>) -> Self {
        Self { excluded }
    }
}

impl FileEnumerator for ScanEnumerator {
    fn strategy(&self) -> Strategy {
        Strategy::Scan
    }

    fn enumerate(&self, root: &Path, recursive: bool) -> Traversal {
        Box::new(DirScan::new(root, recursive, self.excluded.clone()))
    }
}

/// Depth-first scan holding only the sorted entries of the open directories.
struct DirScan {
    stack: Vec<std::vec::IntoIter<DirEntry>>,
    pending: Vec<TraversalError>,
    recursive: bool,
    excluded: Option<PathBuf>,
}

impl DirScan {
    fn new(root: &Path, recursive: bool, excluded: Option<PathBuf>) -> Self {
        let mut scan = Self {
            stack: Vec::new(),
            pending: Vec::new(),
            recursive,
            excluded,
        };
        if !is_excluded(root, scan.excluded.as_deref()) {
            scan.open(root);
        }
        scan
    }

    fn open(&mut self, dir: &Path) {
        let reader = match fs::read_dir(dir) {
            Ok(reader) => reader,
            Err(err) => {
                self.pending.push(TraversalError::new(dir, err));
                return;
            }
        };

        let mut entries = Vec::new();
        for entry in reader {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(err) => self.pending.push(TraversalError::new(dir, err)),
            }
        }
        entries.sort_by_key(|entry| entry.file_name());
        self.stack.push(entries.into_iter());
    }
}

impl Iterator for DirScan {
    type Item = TraversalItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(err) = self.pending.pop() {
                return Some(Err(err));
            }

            let Some(entry) = self.stack.last_mut()?.next() else {
                self.stack.pop();
                continue;
            };

            let path = entry.path();
            if is_excluded(&path, self.excluded.as_deref()) {
                continue;
            }
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => return Some(Err(TraversalError::new(&path, err))),
            };

            if file_type.is_dir() {
                if self.recursive {
                    self.open(&path);
                }
                continue;
            }
            if let Some(item) = candidate_from_entry(&path, file_type) {
                return Some(item);
            }
        }
    }
}

fn is_excluded(path: &Path, excluded: Option<&Path>) -> bool {
    excluded.is_some_and(|excluded| path.starts_with(excluded))
}

/// Regular files and symlinks pointing at regular files.
fn is_file_like(path: &Path, file_type: FileType) -> bool {
    if file_type.is_file() {
        return true;
    }
    file_type.is_symlink() && fs::metadata(path).is_ok_and(|m| m.is_file())
}

/// Turns a directory entry into a candidate; directories and other special
/// entries yield nothing.
fn candidate_from_entry(path: &Path, file_type: FileType) -> Option<TraversalItem> {
    if !is_file_like(path, file_type) {
        return None;
    }
    Some(FileCandidate::from_path(path.to_path_buf()).map_err(|e| TraversalError::new(path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build_tree() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        for dir in ["b_dir", "b_dir/nested", "a_dir", "sorted"] {
            fs::create_dir_all(root.join(dir)).expect("Failed to create directory");
        }
        for file in [
            "top.txt",
            "c.pdf",
            "a_dir/one.png",
            "b_dir/two.doc",
            "b_dir/nested/three.webp",
            "sorted/pdf/already.pdf",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, file.as_bytes()).expect("Failed to write file");
        }
        temp_dir
    }

    fn collect_names(enumerator: &dyn FileEnumerator, root: &Path, recursive: bool) -> Vec<String> {
        enumerator
            .enumerate(root, recursive)
            .filter_map(Result::ok)
            .map(|c| {
                c.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_walk_is_sorted_depth_first() {
        let tree = build_tree();
        let names = collect_names(&WalkEnumerator::new(None), tree.path(), true);
        assert_eq!(
            names,
            vec![
                "a_dir/one.png",
                "b_dir/nested/three.webp",
                "b_dir/two.doc",
                "c.pdf",
                "sorted/pdf/already.pdf",
                "top.txt",
            ]
        );
    }

    #[test]
    fn test_strategies_yield_same_sequence() {
        let tree = build_tree();
        let excluded = Some(tree.path().join("sorted"));
        for recursive in [true, false] {
            let walk = collect_names(&WalkEnumerator::new(excluded.clone()), tree.path(), recursive);
            let scan = collect_names(&ScanEnumerator::new(excluded.clone()), tree.path(), recursive);
            assert_eq!(walk, scan, "recursive = {}", recursive);
        }
    }

    #[test]
    fn test_non_recursive_lists_immediate_files() {
        let tree = build_tree();
        let names = collect_names(&ScanEnumerator::new(None), tree.path(), false);
        assert_eq!(names, vec!["c.pdf", "top.txt"]);
    }

    #[test]
    fn test_excluded_directory_is_pruned() {
        let tree = build_tree();
        let excluded = tree.path().join("sorted");
        let names = collect_names(&WalkEnumerator::new(Some(excluded)), tree.path(), true);
        assert!(names.iter().all(|n| !n.starts_with("sorted")));
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_estimate_counts_files_only() {
        let tree = build_tree();
        let cancel = CancelToken::new();
        assert_eq!(estimate_file_count(tree.path(), true, None, &cancel), 6);
        assert_eq!(estimate_file_count(tree.path(), false, None, &cancel), 2);
        let excluded = tree.path().join("sorted");
        assert_eq!(
            estimate_file_count(tree.path(), true, Some(&excluded), &cancel),
            5
        );
    }

    #[test]
    fn test_estimate_stops_when_cancelled() {
        let tree = build_tree();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(estimate_file_count(tree.path(), true, None, &cancel), 0);
    }

    #[test]
    fn test_select_enumerator_threshold() {
        assert_eq!(select_enumerator(10, 10, None).strategy(), Strategy::Walk);
        assert_eq!(select_enumerator(11, 10, None).strategy(), Strategy::Scan);
    }

    #[test]
    fn test_scan_reports_missing_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");
        let items: Vec<_> = ScanEnumerator::new(None).enumerate(&missing, true).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_enumerated() {
        let tree = build_tree();
        std::os::unix::fs::symlink(tree.path().join("c.pdf"), tree.path().join("link.pdf"))
            .expect("Failed to create symlink");
        let walk = collect_names(&WalkEnumerator::new(None), tree.path(), false);
        let scan = collect_names(&ScanEnumerator::new(None), tree.path(), false);
        assert_eq!(walk, vec!["c.pdf", "link.pdf", "top.txt"]);
        assert_eq!(walk, scan);
    }
}
