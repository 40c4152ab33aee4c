//! filesort - copy a directory tree into per-extension destination folders
//!
//! This library walks a source tree, filters files by an extension allow-list,
//! creates one destination folder per extension and copies every matching file
//! into it, skipping files that were already copied and renaming on name
//! collisions. Runs are configured via TOML files and command-line flags.

pub mod cancel;
pub mod candidate;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod events;
pub mod filter;
pub mod folder_registry;
pub mod job;
pub mod output;
pub mod traverser;

pub use cancel::CancelToken;
pub use candidate::FileCandidate;
pub use config::{ConfigError, SortConfig, SortSettings};
pub use conflict::{ConflictResolver, Resolution};
pub use engine::{CopyEngine, RunSummary, SortError};
pub use events::{EventSink, NullSink, SortEvent};
pub use filter::PathFilter;
pub use folder_registry::{FolderError, FolderRegistry};
pub use job::SortJob;
pub use traverser::{FileEnumerator, ScanEnumerator, Strategy, WalkEnumerator};

pub use cli::{Cli, run_cli};
