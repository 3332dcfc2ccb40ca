//! # Header Module
//!
//! Checks and writes the license header of a set of target files.
//!
//! Each target carries the years its header should show. Files are read and
//! written through `tokio::fs`, several at a time; in check mode nothing is
//! written and the would-be changes can be shown as diffs.

mod file_io;
pub mod targets;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::{debug, trace, warn};

use self::file_io::FileIO;
pub use self::targets::{IncludeFilter, all_tracked_targets, expand_untracked_directories, targets_from_changes};
pub use self::template::{HeaderTemplate, HeaderUpdate, TemplateError, YEAR_PLACEHOLDER};
use crate::diff::DiffManager;
use crate::history::YearRange;
use crate::report::{FileAction, FileReport};
use crate::verbose_log;

/// A file to check, with the years its header should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTarget {
  /// Absolute path used for I/O
  pub path: PathBuf,
  /// Repository-relative path used in reports
  pub display_path: String,
  pub years: YearRange,
}

impl HeaderTarget {
  pub fn new(path: impl Into<PathBuf>, display_path: impl Into<String>, years: YearRange) -> Self {
    Self {
      path: path.into(),
      display_path: display_path.into(),
      years,
    }
  }
}

/// Applies a header template to files.
pub struct HeaderWriter {
  template: HeaderTemplate,
  check_only: bool,
  diff_manager: DiffManager,
  concurrency: usize,
}

impl HeaderWriter {
  /// Creates a writer; `check_only` reports changes without writing them.
  pub fn new(template: HeaderTemplate, check_only: bool) -> Self {
    Self {
      template,
      check_only,
      diff_manager: DiffManager::default(),
      concurrency: num_cpus::get(),
    }
  }

  /// Sets how would-be changes are shown in check mode.
  #[must_use]
  pub fn with_diff_manager(mut self, diff_manager: DiffManager) -> Self {
    self.diff_manager = diff_manager;
    self
  }

  /// Caps how many files are in flight at once.
  #[must_use]
  pub fn with_concurrency(mut self, concurrency: usize) -> Self {
    self.concurrency = concurrency.max(1);
    self
  }

  /// Processes every target and returns one report per target, sorted by
  /// path.
  ///
  /// A file that cannot be read or written is reported as failed; the other
  /// files are still processed.
  pub async fn process(&self, targets: Vec<HeaderTarget>) -> Vec<FileReport> {
    debug!(
      count = targets.len(),
      concurrency = self.concurrency,
      check_only = self.check_only,
      "processing header targets"
    );

    let mut reports: Vec<FileReport> = stream::iter(targets)
      .map(|target| self.process_target(target))
      .buffer_unordered(self.concurrency)
      .collect()
      .await;

    reports.sort_by(|a, b| a.path.cmp(&b.path));
    reports
  }

  async fn process_target(&self, target: HeaderTarget) -> FileReport {
    match self.apply_header(&target).await {
      Ok((years, action)) => FileReport::new(target.display_path, years, action),
      Err(e) => {
        warn!("Error processing {}: {:#}", target.display_path, e);
        FileReport::new(
          target.display_path,
          target.years,
          FileAction::Failed {
            error: format!("{e:#}"),
          },
        )
      }
    }
  }

  async fn apply_header(&self, target: &HeaderTarget) -> Result<(YearRange, FileAction)> {
    trace!("Checking header of: {}", target.path.display());

    let content = FileIO::read_content(&target.path).await?;

    let (years, action, new_content) = match self.template.apply(&content, target.years) {
      HeaderUpdate::Unchanged => return Ok((target.years, FileAction::Unchanged)),
      HeaderUpdate::Added { content: updated } => (target.years, FileAction::Added, updated),
      HeaderUpdate::YearsUpdated {
        previous,
        years,
        content: updated,
      } => (years, FileAction::YearsUpdated { previous }, updated),
    };

    if self.check_only {
      self
        .diff_manager
        .display_diff(Path::new(&target.display_path), &content, &new_content)?;
    } else {
      FileIO::write_content(&target.path, &new_content).await?;
      verbose_log!("Updated header of: {}", target.display_path);
    }

    Ok((years, action))
  }
}
