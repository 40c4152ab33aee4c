/// Copy orchestration.
///
/// The engine drives one run: it validates the source, counts files, picks a
/// traversal strategy and then pushes every discovered file through the
/// filter, the folder registry, conflict resolution and the actual copy.
/// Per-file failures become events; only an invalid source aborts a run.
use crate::cancel::CancelToken;
use crate::candidate::FileCandidate;
use crate::conflict::{ConflictResolver, Resolution};
use crate::events::{EventSink, SortEvent};
use crate::filter::PathFilter;
use crate::folder_registry::FolderRegistry;
use crate::job::SortJob;
use crate::traverser::{Strategy, estimate_file_count, select_enumerator};
use chrono::{DateTime, Utc};
use filetime::{FileTime, set_file_times};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Errors that abort a run before anything is copied.
#[derive(Debug)]
pub enum SortError {
    /// The source root is missing, unreadable or not a directory.
    InvalidSource { path: PathBuf, reason: String },
}

impl std::fmt::Display for SortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSource { path, reason } => {
                write!(f, "Invalid source path {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for SortError {}

/// Result type for a sorting run.
pub type SortResult<T> = Result<T, SortError>;

/// Final report of a run, complete or interrupted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run in seconds.
    pub elapsed_secs: f64,
    /// Files copied (or that would have been, in a dry run).
    pub copied: usize,
    /// Distinct destination folders registered.
    pub folders_created: usize,
    pub skipped_identical: usize,
    pub skipped_filtered: usize,
    /// Per-file failures (folder creation or copy).
    pub errors: usize,
    /// Result of the counting pass.
    pub estimated_total: usize,
    /// Traversal strategy, if the run got that far.
    pub strategy: Option<Strategy>,
    pub cancelled: bool,
    pub dry_run: bool,
    /// Copies per destination folder name.
    pub folders: BTreeMap<String, usize>,
}

/// Counters for one run, owned by the run loop.
#[derive(Debug)]
struct RunStats {
    started: Instant,
    started_at: DateTime<Utc>,
    copied: usize,
    skipped_identical: usize,
    skipped_filtered: usize,
    errors: usize,
    estimated_total: usize,
    strategy: Option<Strategy>,
    folders: BTreeMap<String, usize>,
}

impl RunStats {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            copied: 0,
            skipped_identical: 0,
            skipped_filtered: 0,
            errors: 0,
            estimated_total: 0,
            strategy: None,
            folders: BTreeMap::new(),
        }
    }

    fn record_copy(&mut self, folder_name: &str) {
        self.copied += 1;
        *self.folders.entry(folder_name.to_string()).or_insert(0) += 1;
    }

    /// Copies per elapsed second.
    fn rate(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.copied as f64 / elapsed
        } else {
            0.0
        }
    }

    fn into_summary(self, folders_created: usize, cancelled: bool, dry_run: bool) -> RunSummary {
        RunSummary {
            started_at: self.started_at,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            copied: self.copied,
            folders_created,
            skipped_identical: self.skipped_identical,
            skipped_filtered: self.skipped_filtered,
            errors: self.errors,
            estimated_total: self.estimated_total,
            strategy: self.strategy,
            cancelled,
            dry_run,
            folders: self.folders,
        }
    }
}

/// Runs a [`SortJob`] and reports progress to an [`EventSink`].
///
/// # Examples
///
/// ```no_run
/// use filesort::{CopyEngine, SortEvent, SortJob};
///
/// let job = SortJob::new("/home/me/Downloads", "/home/me/Sorted").with_extensions(["pdf", "png"]);
/// let mut events: Vec<SortEvent> = Vec::new();
/// match CopyEngine::new(job, &mut events).run() {
///     Ok(summary) => println!("{} files copied", summary.copied),
///     Err(e) => eprintln!("Sorting failed: {}", e),
/// }
/// ```
pub struct CopyEngine<'a> {
    job: SortJob,
    sink: &'a mut dyn EventSink,
    cancel: CancelToken,
}

impl<'a> CopyEngine<'a> {
    pub fn new(job: SortJob, sink: &'a mut dyn EventSink) -> Self {
        Self {
            job,
            sink,
            cancel: CancelToken::new(),
        }
    }

    /// Uses `cancel` as the stop signal for this run.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Executes the job.
    ///
    /// Returns `Err` only when the source root is invalid, in which case
    /// nothing has been written. Cancellation still yields a summary with
    /// `cancelled` set and the counters accumulated so far.
    pub fn run(mut self) -> SortResult<RunSummary> {
        let mut stats = RunStats::start();
        self.sink.emit(SortEvent::Started {
            source: self.job.source_root.clone(),
            destination: self.job.destination_root.clone(),
            extensions: self.job.sorted_extensions(),
            recursive: self.job.recursive,
            dry_run: self.job.dry_run,
        });

        let source = validate_source(&self.job.source_root)?;
        let destination = anchor_path(&self.job.destination_root);

        let estimated =
            estimate_file_count(&source, self.job.recursive, Some(&destination), &self.cancel);
        if self.cancel.is_cancelled() {
            return Ok(self.finish(stats, 0, true));
        }
        stats.estimated_total = estimated;
        self.sink.emit(SortEvent::Counted { estimated });
        if estimated == 0 {
            return Ok(self.finish(stats, 0, false));
        }

        let enumerator =
            select_enumerator(estimated, self.job.scan_threshold, Some(destination.clone()));
        stats.strategy = Some(enumerator.strategy());
        self.sink.emit(SortEvent::StrategySelected {
            strategy: enumerator.strategy(),
            estimated,
            threshold: self.job.scan_threshold,
        });

        let filter = PathFilter::from_job(&self.job);
        let mut registry = FolderRegistry::new(&destination, self.job.dry_run);
        let mut traversal = enumerator.enumerate(&source, self.job.recursive);

        let cancelled = loop {
            if self.cancel.is_cancelled() {
                break true;
            }
            let Some(item) = traversal.next() else {
                break false;
            };
            match item {
                Ok(candidate) => {
                    self.process(candidate, &destination, &filter, &mut registry, &mut stats)
                }
                Err(err) => self.sink.emit(SortEvent::Warning {
                    path: err.path,
                    message: err.message,
                }),
            }
        };

        Ok(self.finish(stats, registry.len(), cancelled))
    }

    fn process(
        &mut self,
        candidate: FileCandidate,
        destination: &Path,
        filter: &PathFilter,
        registry: &mut FolderRegistry,
        stats: &mut RunStats,
    ) {
        // Never pick up our own output.
        if candidate.path.starts_with(destination) {
            return;
        }

        if !filter.should_process(&candidate) {
            stats.skipped_filtered += 1;
            self.sink.emit(SortEvent::SkippedFiltered {
                source: candidate.path,
            });
            return;
        }

        let folder = match registry.resolve(&candidate) {
            Ok(folder) => folder,
            Err(e) => {
                stats.errors += 1;
                self.sink.emit(SortEvent::Error {
                    path: candidate.path,
                    message: e.to_string(),
                });
                return;
            }
        };
        if folder.newly_registered {
            self.sink.emit(SortEvent::FolderCreated {
                path: folder.path.clone(),
            });
        }

        let file_name = candidate.path.file_name().unwrap_or_default();
        let target = match ConflictResolver::resolve(&candidate, folder.path.join(file_name)) {
            Resolution::Proceed(target) => target,
            Resolution::SkipIdentical(existing) => {
                stats.skipped_identical += 1;
                self.sink.emit(SortEvent::SkippedIdentical {
                    source: candidate.path,
                    existing,
                });
                return;
            }
        };

        if !self.job.dry_run
            && let Err(e) = copy_with_metadata(&candidate.path, &target)
        {
            stats.errors += 1;
            self.sink.emit(SortEvent::Error {
                path: candidate.path,
                message: format!("Could not copy to {}: {}", target.display(), e),
            });
            return;
        }

        stats.record_copy(&folder.name);
        self.sink.emit(SortEvent::Copied {
            source: candidate.path,
            destination: target,
            copied: stats.copied,
            estimated: stats.estimated_total,
            rate: stats.rate(),
        });
    }

    fn finish(&mut self, stats: RunStats, folders_created: usize, cancelled: bool) -> RunSummary {
        if cancelled {
            self.sink.emit(SortEvent::Cancelled {
                copied: stats.copied,
            });
        }
        let summary = stats.into_summary(folders_created, cancelled, self.job.dry_run);
        self.sink.emit(SortEvent::Finished(summary.clone()));
        summary
    }
}

/// Checks that `path` is an existing directory and returns its canonical form.
fn validate_source(path: &Path) -> SortResult<PathBuf> {
    let invalid = |reason: String| SortError::InvalidSource {
        path: path.to_path_buf(),
        reason,
    };
    let metadata = fs::metadata(path).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    path.canonicalize().map_err(|e| invalid(e.to_string()))
}

/// Canonicalizes the longest existing prefix of `path` and re-appends the rest.
///
/// The destination root may not exist yet, but it has to be comparable with
/// canonical source paths for the self-copy guard to work.
fn anchor_path(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Copies content, then modification/access times and permissions.
fn copy_with_metadata(source: &Path, target: &Path) -> io::Result<()> {
    fs::copy(source, target)?;
    let metadata = fs::metadata(source)?;
    set_file_times(
        target,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;
    fs::set_permissions(target, metadata.permissions())
}
