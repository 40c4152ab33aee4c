//! Structured progress events emitted by the copy engine.

use crate::engine::RunSummary;
use crate::traverser::Strategy;
use std::path::PathBuf;

/// Everything the engine reports while it runs.
///
/// Events are informational; a sink that drops them does not change what
/// ends up on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum SortEvent {
    /// The run started with this configuration.
    Started {
        source: PathBuf,
        destination: PathBuf,
        extensions: Vec<String>,
        recursive: bool,
        dry_run: bool,
    },
    /// The counting pass finished.
    Counted { estimated: usize },
    /// The processing pass is about to start with this strategy.
    StrategySelected {
        strategy: Strategy,
        estimated: usize,
        threshold: usize,
    },
    /// A destination folder was registered (and created unless dry-run).
    FolderCreated { path: PathBuf },
    /// A file was copied (or would be, in a dry run).
    Copied {
        source: PathBuf,
        destination: PathBuf,
        copied: usize,
        estimated: usize,
        /// Copies per elapsed second.
        rate: f64,
    },
    /// An identical file already exists at `existing`.
    SkippedIdentical { source: PathBuf, existing: PathBuf },
    /// The file did not pass the extension allow-list or an exclude pattern.
    SkippedFiltered { source: PathBuf },
    /// Something could not be read during traversal; siblings are still visited.
    Warning { path: PathBuf, message: String },
    /// Processing one file failed; the run continues.
    Error { path: PathBuf, message: String },
    /// The run stopped early after a cancellation request.
    Cancelled { copied: usize },
    /// The run is over.
    Finished(RunSummary),
}

/// Receives events from the engine.
pub trait EventSink {
    fn emit(&mut self, event: SortEvent);
}

/// Collects events in memory.
impl EventSink for Vec<SortEvent> {
    fn emit(&mut self, event: SortEvent) {
        self.push(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SortEvent) {}
}
