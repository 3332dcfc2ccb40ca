//! # Output Module
//!
//! This module centralizes all user-facing output for headerstamp.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: Show actionable information without requiring flags
//! - **Scannable**: Use formatting to make output easy to parse visually
//! - **Progressive**: More detail with `-v`, silence with `-q`
//! - **Scriptable**: Keep stdout predictable for piping/automation

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::reconcile::FileChange;
use crate::report::{FileAction, FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Success/has header
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Missing header/failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Year updated
  pub const UPDATED: &str = "\u{21bb}"; // ↻
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Format of the `changes` listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ChangesFormat {
  /// One `path<TAB>years` line per file
  #[default]
  Text,
  /// A JSON array of `{path, creation_year, last_edition_year}`
  Json,
}

/// Maps repository-relative paths to what the user should see.
///
/// Paths are shown relative to the directory the command was started from,
/// so they can be pasted back into a shell.
#[derive(Debug, Clone, Copy)]
pub struct PathDisplay<'a> {
  workspace_root: &'a Path,
  current_dir: Option<&'a Path>,
}

impl<'a> PathDisplay<'a> {
  pub const fn new(workspace_root: &'a Path, current_dir: Option<&'a Path>) -> Self {
    Self {
      workspace_root,
      current_dir,
    }
  }

  pub fn show(&self, relative: &str) -> String {
    make_relative_path(&self.workspace_root.join(relative), self.current_dir).unwrap_or_else(|| relative.to_string())
  }
}

/// Print the initial "Checking N files..." or "Processing N files..." message.
pub fn print_start_message(file_count: usize, modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let verb = if modify_mode { "Processing" } else { "Checking" };
  println!("{} {} {}...", verb, file_count, plural(file_count));
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print the per-action file lists of a run.
///
/// In check mode the lists name files that would change; in quiet check mode
/// only their paths are printed, one per line, for scripting.
pub fn print_results(reports: &[FileReport], modify_mode: bool, paths: &PathDisplay<'_>) {
  let added: Vec<_> = reports.iter().filter(|r| r.action == FileAction::Added).collect();
  let updated: Vec<_> = reports
    .iter()
    .filter(|r| matches!(r.action, FileAction::YearsUpdated { .. }))
    .collect();

  if is_quiet() {
    if !modify_mode {
      for report in added.iter().chain(updated.iter()) {
        println!("{}", paths.show(&report.path));
      }
    }
    return;
  }

  let success = symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()).to_string();
  let failure = symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()).to_string();
  let refresh = symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string();

  if modify_mode {
    print_file_list(&success, &format!("Added header to {}", counted(added.len())), &added, paths);
    print_file_list(&refresh, &format!("Updated years in {}", counted(updated.len())), &updated, paths);
  } else {
    print_file_list(&failure, &format!("{} missing headers", counted(added.len())), &added, paths);
    print_file_list(&refresh, &format!("{} with outdated years", counted(updated.len())), &updated, paths);
  }
}

/// Print the files that could not be processed, with the reason.
pub fn print_failed_files(reports: &[FileReport], paths: &PathDisplay<'_>) {
  let failed: Vec<_> = reports
    .iter()
    .filter_map(|r| match &r.action {
      FileAction::Failed { error } => Some((r, error)),
      _ => None,
    })
    .collect();

  if failed.is_empty() {
    return;
  }

  eprintln!(
    "{} {} could not be processed:",
    symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
    counted(failed.len())
  );
  for (report, error) in failed {
    eprintln!("  {}: {}", paths.show(&report.path), error);
  }
}

/// Print the success message when every header is in place.
pub fn print_all_files_ok() {
  if is_quiet() {
    return;
  }

  println!(
    "{} All files have up-to-date headers.",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

/// Print the processing summary.
///
/// Format: "Summary: X OK, Y added, Z updated, W failed"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  let failed_str = if summary.failed > 0 {
    summary.failed.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    summary.failed.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };

  let mut summary_line = format!(
    "Summary: {} OK, {} added, {} updated, {} failed",
    summary.unchanged.if_supports_color(Stream::Stdout, |s| s.cyan()),
    summary.headers_added.if_supports_color(Stream::Stdout, |s| s.cyan()),
    summary.years_updated.if_supports_color(Stream::Stdout, |s| s.cyan()),
    failed_str
  );

  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }

  println!("{summary_line}");
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

/// Renders the reconciled change set, with repository-relative paths.
pub fn render_changes(changes: &[FileChange], format: ChangesFormat) -> Result<String> {
  match format {
    ChangesFormat::Text => Ok(
      changes
        .iter()
        .map(|change| format!("{}\t{}\n", change.path(), change.years()))
        .collect(),
    ),
    ChangesFormat::Json => {
      let mut json = serde_json::to_string_pretty(changes).with_context(|| "Failed to serialize changes")?;
      json.push('\n');
      Ok(json)
    }
  }
}

/// Prints the reconciled change set to stdout.
///
/// This is the command's data, so it is printed even in quiet mode.
pub fn print_changes(changes: &[FileChange], format: ChangesFormat) -> Result<()> {
  print!("{}", render_changes(changes, format)?);
  Ok(())
}

fn print_file_list(symbol: &str, title: &str, files: &[&FileReport], paths: &PathDisplay<'_>) {
  if files.is_empty() {
    return;
  }

  println!("{symbol} {title}:");

  let count = files.len();
  let limit = if is_verbose() { count } else { DEFAULT_FILE_LIST_LIMIT };

  for file in files.iter().take(limit) {
    println!("  {} ({})", paths.show(&file.path), file.years);
  }

  if count > limit {
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      count - limit
    );
  }
}

const fn plural(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

fn counted(count: usize) -> String {
  format!("{} {}", count, plural(count))
}

/// Make a path relative to `base` for display.
///
/// Returns `None` when there is no base or no relative form.
fn make_relative_path(path: &Path, base: Option<&Path>) -> Option<String> {
  let relative = pathdiff::diff_paths(path, base?)?;
  Some(relative.to_string_lossy().to_string())
}
