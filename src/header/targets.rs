//! # Target Selection Module
//!
//! Turns the reconciled change set, or every tracked file with `--all`, into
//! the list of files whose header is checked.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::debug;

use super::HeaderTarget;
use crate::clock::Clock;
use crate::history::resolve_history;
use crate::reconcile::FileChange;
use crate::vcs::{GitCli, Vcs, VcsError};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

/// Include patterns, matched against repository-relative paths.
///
/// A pattern also matches every file below a directory it matches, so `src`
/// selects `src/lib.rs`. No patterns at all means every file is included.
#[derive(Debug, Clone, Default)]
pub struct IncludeFilter {
  patterns: Vec<Pattern>,
}

impl IncludeFilter {
  pub fn new(patterns: &[String]) -> Result<Self, glob::PatternError> {
    let patterns = patterns
      .iter()
      .map(|p| Pattern::new(p.trim_end_matches('/')))
      .collect::<Result<_, _>>()?;
    Ok(Self { patterns })
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  pub fn matches(&self, path: &str) -> bool {
    if self.patterns.is_empty() {
      return true;
    }

    let mut candidates = path.match_indices('/').map(|(i, _)| &path[..i]).chain([path]);
    candidates.any(|candidate| self.patterns.iter().any(|p| p.matches_with(candidate, MATCH_OPTIONS)))
  }
}

/// Keeps the changed files that match `filter` and still exist as regular
/// files under `root`.
pub fn targets_from_changes(root: &Path, changes: &[FileChange], filter: &IncludeFilter) -> Vec<HeaderTarget> {
  changes
    .iter()
    .filter(|change| filter.matches(change.path()))
    .filter_map(|change| {
      let path = root.join(change.path());
      if !path.is_file() {
        debug!("Skipping {}: not a regular file", change.path());
        return None;
      }
      Some(HeaderTarget::new(path, change.path(), change.years()))
    })
    .collect()
}

/// Replaces each untracked directory entry (`pkg/`) with the untracked files
/// below it.
///
/// Status reports a new directory as a single entry, while headers go into
/// the files inside it. Each listed file gets its own resolved years.
///
/// # Errors
///
/// Fails when listing a directory or resolving a file's history fails.
pub fn expand_untracked_directories<C>(
  git: &GitCli,
  changes: Vec<FileChange>,
  clock: &C,
) -> Result<Vec<FileChange>, VcsError>
where
  C: Clock + ?Sized,
{
  let mut expanded = Vec::with_capacity(changes.len());

  for change in changes {
    if !change.path().ends_with('/') {
      expanded.push(change);
      continue;
    }

    let files = git.untracked_files(change.path())?;
    debug!(directory = change.path(), files = files.len(), "expanded untracked directory");

    for path in files {
      let years = resolve_history(git, &path, clock)?.years();
      expanded.push(FileChange::new(path, years.start, years.end));
    }
  }

  Ok(expanded)
}

/// Builds a target for every tracked file matching `filter`, resolving the
/// history of each one.
///
/// # Errors
///
/// The first failing log query aborts the selection.
pub fn all_tracked_targets<V, C>(
  root: &Path,
  tracked: &[String],
  filter: &IncludeFilter,
  vcs: &V,
  clock: &C,
) -> Result<Vec<HeaderTarget>, VcsError>
where
  V: Vcs + ?Sized,
  C: Clock + ?Sized,
{
  let selected: Vec<&String> = tracked
    .iter()
    .filter(|path| filter.matches(path))
    .filter(|path| root.join(path).is_file())
    .collect();

  debug!(tracked = tracked.len(), selected = selected.len(), "selected tracked files");

  selected
    .into_iter()
    .map(|path| {
      let history = resolve_history(vcs, path, clock)?;
      Ok(HeaderTarget::new(root.join(path), path.as_str(), history.years()))
    })
    .collect()
}
