//! # Reconcile Module
//!
//! Builds the list of files whose headers need attention: everything
//! committed ahead of the baseline branch plus everything pending in the index
//! or working tree, each path once, with its creation and last edition years.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::changes::{ChangeStatus, parse_committed_changes, parse_porcelain};
use crate::clock::Clock;
use crate::history::{YearRange, resolve_history};
use crate::vcs::{Vcs, VcsError};

/// Remote branch that committed changes are compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
  pub remote: String,
  pub branch: String,
}

impl Baseline {
  pub fn new(remote: impl Into<String>, branch: impl Into<String>) -> Self {
    Self {
      remote: remote.into(),
      branch: branch.into(),
    }
  }

  /// The revision range of commits on `HEAD` that the baseline lacks.
  pub fn range(&self) -> String {
    format!("{}/{}..HEAD", self.remote, self.branch)
  }
}

impl Default for Baseline {
  fn default() -> Self {
    Self::new("origin", "main")
  }
}

impl fmt::Display for Baseline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.remote, self.branch)
  }
}

/// A file that needs its header checked, with the years the header should
/// carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileChange {
  path: String,
  creation_year: i32,
  last_edition_year: i32,
}

impl FileChange {
  /// Creates a change record.
  ///
  /// `last_edition_year` is raised to `creation_year` if it is earlier.
  pub fn new(path: impl Into<String>, creation_year: i32, last_edition_year: i32) -> Self {
    Self {
      path: path.into(),
      creation_year,
      last_edition_year: last_edition_year.max(creation_year),
    }
  }

  /// Repository-relative path.
  pub fn path(&self) -> &str {
    &self.path
  }

  pub const fn creation_year(&self) -> i32 {
    self.creation_year
  }

  pub const fn last_edition_year(&self) -> i32 {
    self.last_edition_year
  }

  pub const fn years(&self) -> YearRange {
    YearRange::new(self.creation_year, self.last_edition_year)
  }
}

/// Paths committed on `HEAD` since the baseline, deletions excluded.
pub fn committed_changes<V: Vcs + ?Sized>(vcs: &V, baseline: &Baseline) -> Result<Vec<String>, VcsError> {
  let range = baseline.range();
  let diff = vcs.diff(&["--name-status", &range])?;
  let paths = parse_committed_changes(&diff)?;
  debug!(range = %range, count = paths.len(), "committed changes");
  Ok(paths)
}

/// Paths pending in the index or working tree, deletions excluded.
///
/// With `exclude_untracked`, files git does not track yet are left out too.
pub fn uncommitted_changes<V: Vcs + ?Sized>(vcs: &V, exclude_untracked: bool) -> Result<Vec<String>, VcsError> {
  let status = vcs.status(&["--porcelain"])?;
  let paths: Vec<String> = parse_porcelain(&status)?
    .into_iter()
    .filter(|entry| !(exclude_untracked && entry.status == ChangeStatus::Untracked))
    .filter_map(|entry| entry.into_surviving_path())
    .collect();
  debug!(count = paths.len(), exclude_untracked, "uncommitted changes");
  Ok(paths)
}

/// Merges path lists, keeping the first occurrence of every path.
pub fn merge_unique<I>(lists: I) -> Vec<String>
where
  I: IntoIterator<Item = Vec<String>>,
{
  let mut seen = HashSet::new();
  lists
    .into_iter()
    .flatten()
    .filter(|path| seen.insert(path.clone()))
    .collect()
}

/// Discovers every file changed relative to `baseline` and resolves its years.
///
/// Committed paths come first, then uncommitted ones, each path once.
/// `exclude_untracked` drops files that were never added to git.
///
/// # Errors
///
/// The first failing diff, status or log query aborts the whole operation;
/// no partial list is returned.
pub fn get_vcs_changes<V, C>(
  vcs: &V,
  clock: &C,
  baseline: &Baseline,
  exclude_untracked: bool,
) -> Result<Vec<FileChange>, VcsError>
where
  V: Vcs + ?Sized,
  C: Clock + ?Sized,
{
  let committed = committed_changes(vcs, baseline)?;
  let uncommitted = uncommitted_changes(vcs, exclude_untracked)?;
  let paths = merge_unique([committed, uncommitted]);

  debug!(baseline = %baseline, count = paths.len(), "resolving history of changed files");

  paths
    .into_iter()
    .map(|path| {
      let history = resolve_history(vcs, &path, clock)?;
      Ok(FileChange::new(path, history.creation_year, history.last_edition_year))
    })
    .collect()
}
