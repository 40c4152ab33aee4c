//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored
//! output, the copy progress bar and the summary table. [`ConsoleReporter`]
//! turns engine events into terminal output.

use crate::engine::RunSummary;
use crate::events::{EventSink, SortEvent};
use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for copy runs
/// - Summary tables with per-folder counts
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesort::output::OutputFormatter;
    /// OutputFormatter::success("All files copied!");
    /// ```
    pub fn success(message: &str) {
        println!("{}", Self::success_line(message));
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{}", Self::error_line(message));
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        eprintln!("{}", Self::warning_line(message));
    }

    /// Prints an info message in cyan.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesort::output::OutputFormatter;
    /// OutputFormatter::info("Source: /home/user/Downloads");
    /// ```
    pub fn info(message: &str) {
        println!("{}", Self::info_line(message));
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    fn success_line(message: &str) -> String {
        format!("{} {}", "✓".green(), message)
    }

    fn error_line(message: &str) -> String {
        format!("{} {}", "✗".red(), message)
    }

    fn warning_line(message: &str) -> String {
        format!("{} {}", "⚠".yellow(), message)
    }

    fn info_line(message: &str) -> String {
        message.cyan().to_string()
    }

    /// Creates and returns a progress bar for a copy run.
    ///
    /// # Arguments
    ///
    /// * `total` - Estimated number of files to process
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a summary table with the number of files copied per folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("pdf".to_string(), 15);
    /// counts.insert("png".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_folder_len = folder_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // At least "Folder" width

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        for (folder, count) in folder_counts {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                file_word(*count),
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files),
            width = max_folder_len
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// How much the console reporter prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Every event, including per-file copy and skip lines.
    Normal,
    /// Start/strategy lines, warnings, errors and the summary.
    Quiet,
    /// Warnings and errors only (stderr); stdout is left for machine output.
    Silent,
}

/// Renders [`SortEvent`]s on the terminal.
pub struct ConsoleReporter {
    verbosity: Verbosity,
    dry_run: bool,
    progress: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            dry_run: false,
            progress: None,
        }
    }

    /// Prints a line above the progress bar, or directly when there is none.
    fn line(&self, line: String) {
        match &self.progress {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }

    fn info(&self, message: &str) {
        if self.verbosity != Verbosity::Silent {
            self.line(OutputFormatter::info_line(message));
        }
    }

    fn detail(&self, line: String) {
        if self.verbosity == Verbosity::Normal {
            self.line(line);
        }
    }

    fn problem(&self, line: String) {
        match &self.progress {
            Some(pb) => pb.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    fn tick(&self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    fn print_summary(&mut self, summary: &RunSummary) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
        if self.verbosity == Verbosity::Silent {
            return;
        }

        if summary.cancelled {
            OutputFormatter::warning(&format!(
                "Operation cancelled by user. {} {} copied before interruption.",
                summary.copied,
                file_word(summary.copied)
            ));
        }

        OutputFormatter::plain("");
        OutputFormatter::info(&format!("Completed in {:.2} seconds.", summary.elapsed_secs));
        let copied = format!(
            "{} {} {}.",
            summary.copied,
            file_word(summary.copied),
            if summary.dry_run {
                "would be copied"
            } else {
                "copied successfully"
            }
        );
        if summary.dry_run {
            OutputFormatter::dry_run_notice(&copied);
        } else {
            OutputFormatter::success(&copied);
        }
        OutputFormatter::info(&format!(
            "Created {} destination folders.",
            summary.folders_created
        ));
        if summary.skipped_identical > 0 {
            OutputFormatter::plain(&format!(
                "Skipped {} already copied {}.",
                summary.skipped_identical,
                file_word(summary.skipped_identical)
            ));
        }
        if summary.errors > 0 {
            OutputFormatter::warning(&format!(
                "{} {} could not be copied. Please review errors above.",
                summary.errors,
                file_word(summary.errors)
            ));
        }

        if !summary.folders.is_empty() {
            OutputFormatter::summary_table(&summary.folders, summary.copied);
        }
    }
}

impl EventSink for ConsoleReporter {
    fn emit(&mut self, event: SortEvent) {
        match event {
            SortEvent::Started {
                source,
                destination,
                extensions,
                recursive,
                dry_run,
            } => {
                self.dry_run = dry_run;
                if dry_run && self.verbosity != Verbosity::Silent {
                    OutputFormatter::dry_run_notice("No files will be copied.");
                }
                self.info("Starting file sorter...");
                self.info(&format!("Source: {}", source.display()));
                self.info(&format!("Destination: {}", destination.display()));
                let extensions = if extensions.is_empty() {
                    "All files".to_string()
                } else {
                    extensions.join(", ")
                };
                self.info(&format!("Extensions: {}", extensions));
                self.info(&format!("Recursive: {}", recursive));
            }
            SortEvent::Counted { estimated } => {
                if estimated == 0 {
                    self.info("No files found to process.");
                } else {
                    self.info(&format!("Found approximately {} files.", estimated));
                }
            }
            SortEvent::StrategySelected {
                strategy,
                estimated,
                threshold,
            } => {
                if estimated > threshold {
                    self.info(&format!(
                        "Large dataset detected (>{} files). Using {}.",
                        threshold, strategy
                    ));
                } else {
                    self.info(&format!("Using {}.", strategy));
                }
                if self.verbosity != Verbosity::Silent {
                    self.progress = Some(OutputFormatter::create_progress_bar(estimated as u64));
                } else {
                    self.progress = Some(ProgressBar::with_draw_target(
                        Some(estimated as u64),
                        ProgressDrawTarget::hidden(),
                    ));
                }
            }
            SortEvent::FolderCreated { path } => {
                let verb = if self.dry_run { "Would create" } else { "Created" };
                self.detail(OutputFormatter::info_line(&format!(
                    "{} folder: {}",
                    verb,
                    path.display()
                )));
            }
            SortEvent::Copied {
                source,
                copied,
                estimated,
                rate,
                ..
            } => {
                self.tick();
                let verb = if self.dry_run { "Would copy" } else { "Copied" };
                self.detail(format!(
                    "[{}/{}] {}: {} ({:.1} files/sec)",
                    copied,
                    estimated,
                    verb,
                    display_name(&source),
                    rate
                ));
            }
            SortEvent::SkippedIdentical { source, .. } => {
                self.tick();
                self.detail(format!(
                    "{} File already exists: {}",
                    "[SKIP]".dimmed(),
                    display_name(&source)
                ));
            }
            SortEvent::SkippedFiltered { .. } => self.tick(),
            SortEvent::Warning { path, message } => {
                self.problem(OutputFormatter::warning_line(&format!(
                    "Could not access {}: {}",
                    path.display(),
                    message
                )));
            }
            SortEvent::Error { path, message } => {
                self.tick();
                self.problem(OutputFormatter::error_line(&format!(
                    "{}: {}",
                    path.display(),
                    message
                )));
            }
            SortEvent::Cancelled { .. } => {
                if let Some(pb) = &self.progress {
                    pb.abandon();
                }
            }
            SortEvent::Finished(summary) => self.print_summary(&summary),
        }
    }
}
