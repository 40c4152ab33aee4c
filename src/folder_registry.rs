/// Lazily created destination folders, one per extension.
///
/// The registry remembers every folder it has resolved during a run so that
/// each distinct extension costs at most one `create_dir_all` call.
use crate::candidate::FileCandidate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Errors that can occur while resolving a destination folder.
#[derive(Debug)]
pub enum FolderError {
    /// Failed to create the folder (or one of its parents).
    CreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for FolderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreationFailed { path, source } => {
                write!(f, "Could not create folder {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for FolderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreationFailed { source, .. } => Some(source),
        }
    }
}

/// Result type for folder resolution.
pub type FolderResult<T> = Result<T, FolderError>;

/// A folder returned by [`FolderRegistry::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFolder {
    /// Absolute path of the destination folder.
    pub path: PathBuf,
    /// Folder name (extension without the dot, or `no_extension`).
    pub name: String,
    /// True the first time this folder is resolved during the run.
    pub newly_registered: bool,
}

/// Maps folder names to their created destination directories.
///
/// Entries are only ever added. With `dry_run` enabled the registry records
/// folders without touching the filesystem.
#[derive(Debug)]
pub struct FolderRegistry {
    destination_root: PathBuf,
    folders: HashMap<String, PathBuf>,
    dry_run: bool,
}

impl FolderRegistry {
    pub fn new(destination_root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            destination_root: destination_root.into(),
            folders: HashMap::new(),
            dry_run,
        }
    }

    /// Returns the destination folder for `candidate`, creating it on first use.
    ///
    /// A failure only affects this candidate; the folder is not registered,
    /// so a later candidate with the same extension tries again.
    pub fn resolve(&mut self, candidate: &FileCandidate) -> FolderResult<ResolvedFolder> {
        let name = candidate.folder_name();

        if let Some(path) = self.folders.get(&name) {
            return Ok(ResolvedFolder {
                path: path.clone(),
                name,
                newly_registered: false,
            });
        }

        let path = self.destination_root.join(&name);
        if !self.dry_run {
            fs::create_dir_all(&path).map_err(|e| FolderError::CreationFailed {
                path: path.clone(),
                source: e,
            })?;
        }

        self.folders.insert(name.clone(), path.clone());
        Ok(ResolvedFolder {
            path,
            name,
            newly_registered: true,
        })
    }

    /// Number of folders resolved so far.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}
