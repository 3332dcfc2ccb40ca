//! # History Module
//!
//! Works out which years a file was created and last edited in, from the
//! commit timestamps the version-control log reports for it.
//!
//! The policy is:
//! - no commits: the file is brand new, both years are the current year;
//! - one commit: that commit created the file, and since the file is being
//!   looked at because of a pending change, it was last edited this year;
//! - several commits: the oldest commit created it, the newest one last
//!   edited it.

use std::cmp::{max, min};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike};
use tracing::debug;

use crate::changes::non_blank_lines;
use crate::clock::Clock;
use crate::vcs::{OutputFormat, ParseError, Vcs, VcsError};

/// Commit years of a single path, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitHistory {
  years: Vec<i32>,
}

impl CommitHistory {
  pub fn years(&self) -> &[i32] {
    &self.years
  }
}

/// Parses `log --format=%at` output: one Unix timestamp per line.
///
/// Each timestamp is converted to its UTC calendar year. Blank lines are
/// ignored; anything else that is not a representable timestamp is an error.
pub fn parse_commit_history(log_text: &str) -> Result<CommitHistory, ParseError> {
  let years = non_blank_lines(log_text)
    .map(|(line_number, line)| {
      line
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .map(|instant| instant.year())
        .ok_or_else(|| ParseError::new(OutputFormat::Timestamps, line_number, line, "not a valid Unix timestamp"))
    })
    .collect::<Result<Vec<_>, _>>()?;

  Ok(CommitHistory { years })
}

/// Creation and last edition years of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHistory {
  pub creation_year: i32,
  pub last_edition_year: i32,
}

impl FileHistory {
  /// Applies the year policy to a parsed history.
  ///
  /// Oldest and newest are taken as the minimum and maximum year so that the
  /// edition year never precedes the creation year, even when author dates
  /// are out of order or the clock is behind the last commit.
  pub fn from_commits(history: &CommitHistory, current_year: i32) -> Self {
    let (creation_year, last_edition_year) = match history.years() {
      [] => (current_year, current_year),
      [only] => (*only, max(*only, current_year)),
      years => {
        let oldest = years.iter().copied().fold(i32::MAX, min);
        let newest = years.iter().copied().fold(i32::MIN, max);
        (oldest, newest)
      }
    };

    Self {
      creation_year,
      last_edition_year,
    }
  }

  pub const fn years(&self) -> YearRange {
    YearRange::new(self.creation_year, self.last_edition_year)
  }
}

/// Looks up the commit history of `path` and applies the year policy.
///
/// # Errors
///
/// Propagates any failure of the log query, and fails on log output that is
/// not one timestamp per line.
pub fn resolve_history<V, C>(vcs: &V, path: &str, clock: &C) -> Result<FileHistory, VcsError>
where
  V: Vcs + ?Sized,
  C: Clock + ?Sized,
{
  let log = vcs.log(&["--format=%at", "--", path])?;
  let history = parse_commit_history(&log)?;
  let resolved = FileHistory::from_commits(&history, clock.current_year());

  debug!(
    path,
    commits = history.years().len(),
    creation = resolved.creation_year,
    last_edition = resolved.last_edition_year,
    "resolved file history"
  );

  Ok(resolved)
}

/// A copyright year or year range, as written into a header.
///
/// Displays as `2018` when both ends are equal and `2017-2018` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
  pub start: i32,
  pub end: i32,
}

impl YearRange {
  pub const fn new(start: i32, end: i32) -> Self {
    Self { start, end }
  }

  pub const fn single(year: i32) -> Self {
    Self::new(year, year)
  }

  /// Widens the range so it also spans `other`.
  #[must_use]
  pub fn covering(self, other: Self) -> Self {
    Self::new(min(self.start, other.start), max(self.end, other.end))
  }
}

impl fmt::Display for YearRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.start == self.end {
      write!(f, "{}", self.start)
    } else {
      write!(f, "{}-{}", self.start, self.end)
    }
  }
}

impl serde::Serialize for YearRange {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Error returned when a year range cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid year range: {0:?}")]
pub struct InvalidYearRange(pub String);

impl FromStr for YearRange {
  type Err = InvalidYearRange;

  /// Accepts `2018`, `2017-2018` and `2017 - 2018`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || InvalidYearRange(s.to_string());
    let parse_year = |text: &str| text.trim().parse::<i32>().ok().filter(|year| *year >= 0);

    match s.split_once('-') {
      Some((start, end)) => {
        let start = parse_year(start).ok_or_else(invalid)?;
        let end = parse_year(end).ok_or_else(invalid)?;
        if start > end {
          return Err(invalid());
        }
        Ok(Self::new(start, end))
      }
      None => parse_year(s).map(Self::single).ok_or_else(invalid),
    }
  }
}
