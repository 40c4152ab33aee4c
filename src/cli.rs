//! Command-line interface module for filesort.
//!
//! This module handles:
//! - Argument parsing
//! - Merging flags with the configuration file
//! - Running the copy engine with console reporting
//! - Optional JSON output of the run summary

use crate::cancel::CancelToken;
use crate::config::{SortConfig, SortSettings};
use crate::engine::{CopyEngine, RunSummary};
use crate::output::{ConsoleReporter, Verbosity};
use clap::Parser;
use std::path::PathBuf;

/// Copy files into destination folders named after their extension.
#[derive(Debug, Clone, Parser)]
#[command(name = "filesort", version, about)]
pub struct Cli {
    /// Directory tree to copy files from.
    pub source: Option<PathBuf>,

    /// Directory to create the per-extension folders in.
    pub destination: Option<PathBuf>,

    /// Only copy files with these extensions (repeatable, comma-separated).
    #[arg(short = 'e', long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Only look at files directly inside the source directory.
    #[arg(long)]
    pub no_recursive: bool,

    /// File count above which directories are scanned one at a time.
    #[arg(short = 't', long = "threshold")]
    pub scan_threshold: Option<usize>,

    /// Skip files matching this glob pattern (repeatable).
    #[arg(long = "exclude")]
    pub exclude_patterns: Vec<String>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show what would be copied without copying anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Only print the summary, warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Settings given on the command line; unset flags stay `None`.
    pub fn settings(&self) -> SortSettings {
        SortSettings {
            source: self.source.clone(),
            destination: self.destination.clone(),
            extensions: self.extensions.clone(),
            recursive: self.no_recursive.then_some(false),
            scan_threshold: self.scan_threshold,
            exclude_patterns: self.exclude_patterns.clone(),
            dry_run: self.dry_run.then_some(true),
        }
    }

    fn verbosity(&self) -> Verbosity {
        if self.json {
            Verbosity::Silent
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

/// Runs one sorting job as described by `cli`.
///
/// Configuration is loaded first and command-line flags are layered on top.
/// `cancel` is polled between files; a cancelled run still returns its
/// partial summary.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use filesort::{CancelToken, Cli, run_cli};
///
/// let cli = Cli::parse_from(["filesort", "/home/me/Downloads", "/home/me/Sorted", "-e", "pdf,png"]);
/// match run_cli(&cli, CancelToken::new()) {
///     Ok(summary) => println!("{} files copied", summary.copied),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli, cancel: CancelToken) -> Result<RunSummary, String> {
    let config = SortConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let job = config
        .sort
        .merge(cli.settings())
        .into_job()
        .map_err(|e| format!("Error in configuration: {}", e))?;

    let mut reporter = ConsoleReporter::new(cli.verbosity());
    let summary = CopyEngine::new(job, &mut reporter)
        .with_cancel_token(cancel)
        .run()
        .map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Could not serialize summary: {}", e))?;
        println!("{}", json);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::parse_from([
            "filesort",
            "/in",
            "/out",
            "-e",
            "pdf,png",
            "--ext",
            ".webp",
            "--no-recursive",
            "-t",
            "50",
            "--exclude",
            "*.part",
            "--dry-run",
        ]);

        let settings = cli.settings();
        assert_eq!(settings.source, Some(PathBuf::from("/in")));
        assert_eq!(settings.destination, Some(PathBuf::from("/out")));
        assert_eq!(settings.extensions, vec!["pdf", "png", ".webp"]);
        assert_eq!(settings.recursive, Some(false));
        assert_eq!(settings.scan_threshold, Some(50));
        assert_eq!(settings.exclude_patterns, vec!["*.part"]);
        assert_eq!(settings.dry_run, Some(true));
    }

    #[test]
    fn test_unset_flags_do_not_override_config() {
        let cli = Cli::parse_from(["filesort"]);
        let settings = cli.settings();
        assert_eq!(settings, SortSettings::default());
        assert_eq!(cli.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_json_wins_over_quiet() {
        let cli = Cli::parse_from(["filesort", "--json", "--quiet"]);
        assert_eq!(cli.verbosity(), Verbosity::Silent);
    }
}
