//! # Report Module
//!
//! Per-file records of what the header writer did (or would do), a summary of
//! them, and a JSON report written with `--report-json`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::history::YearRange;

/// Information about a processed file for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
  /// Repository-relative path
  pub path: String,
  /// Years the header carries after processing
  pub years: YearRange,
  pub action: FileAction,
}

impl FileReport {
  pub fn new(path: impl Into<String>, years: YearRange, action: FileAction) -> Self {
    Self {
      path: path.into(),
      years,
      action,
    }
  }
}

/// Possible outcomes for a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FileAction {
  /// The header was already correct
  Unchanged,
  /// A header was added (or needs adding in check mode)
  Added,
  /// The header's years were rewritten (or need rewriting in check mode)
  YearsUpdated { previous: String },
  /// The file could not be read or written
  Failed { error: String },
}

impl FileAction {
  pub const fn is_failure(&self) -> bool {
    matches!(self, Self::Failed { .. })
  }
}

/// Summary of the processing results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingSummary {
  pub total_files: usize,
  pub headers_added: usize,
  pub years_updated: usize,
  pub unchanged: usize,
  pub failed: usize,
  /// Total processing time
  #[serde(skip_serializing)]
  pub processing_time: Duration,
  #[serde(rename = "processing_time_seconds")]
  pub processing_time_secs: f64,
}

impl ProcessingSummary {
  /// Tallies a run's reports.
  pub fn from_reports(files: &[FileReport], processing_time: Duration) -> Self {
    let mut summary = Self {
      total_files: files.len(),
      processing_time,
      processing_time_secs: processing_time.as_secs_f64(),
      ..Self::default()
    };

    for file in files {
      match file.action {
        FileAction::Unchanged => summary.unchanged += 1,
        FileAction::Added => summary.headers_added += 1,
        FileAction::YearsUpdated { .. } => summary.years_updated += 1,
        FileAction::Failed { .. } => summary.failed += 1,
      }
    }

    summary
  }

  /// Number of files that were (or would be) modified.
  pub const fn changed(&self) -> usize {
    self.headers_added + self.years_updated
  }
}

#[derive(Serialize)]
struct JsonReport<'a> {
  generated_at: String,
  check_only: bool,
  summary: &'a ProcessingSummary,
  files: &'a [FileReport],
}

/// Renders the JSON report.
pub fn render_json_report(files: &[FileReport], summary: &ProcessingSummary, check_only: bool) -> Result<String> {
  let report = JsonReport {
    generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    check_only,
    summary,
    files,
  };
  serde_json::to_string_pretty(&report).with_context(|| "Failed to serialize report")
}

/// Writes the JSON report to `output_path`.
pub fn write_json_report(
  output_path: &Path,
  files: &[FileReport],
  summary: &ProcessingSummary,
  check_only: bool,
) -> Result<()> {
  let content = render_json_report(files, summary, check_only)?;
  fs::write(output_path, content).with_context(|| format!("Failed to write report to {}", output_path.display()))
}
