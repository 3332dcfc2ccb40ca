//! # VCS Module
//!
//! The version-control capability the change discovery core is built on.
//!
//! The core only ever needs three text-in/text-out operations from the
//! version-control system: a name-status diff, a porcelain status and a
//! timestamp-only log. They are expressed as the [`Vcs`] trait so the parsers
//! and the reconciler can run against canned output in tests, while
//! [`GitCli`] shells out to the real `git` binary.

mod git;

use std::fmt;
use std::string::FromUtf8Error;

pub use git::GitCli;

/// Text produced by one of the version-control operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  /// `status<TAB>path[<TAB>newpath]` lines from `diff --name-status`.
  NameStatus,
  /// Two-column `XY path` lines from `status --porcelain`.
  Porcelain,
  /// One decimal Unix timestamp per line from `log --format=%at`.
  Timestamps,
}

impl fmt::Display for OutputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::NameStatus => "name-status diff",
      Self::Porcelain => "porcelain status",
      Self::Timestamps => "timestamp log",
    };
    f.write_str(name)
  }
}

/// A line of version-control output that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {format} output at line {line_number}: {reason}: {line:?}")]
pub struct ParseError {
  /// Which output format was being parsed.
  pub format: OutputFormat,
  /// 1-based line number within the output.
  pub line_number: usize,
  /// The offending line, verbatim.
  pub line: String,
  /// Short description of what was wrong with it.
  pub reason: &'static str,
}

impl ParseError {
  pub(crate) fn new(format: OutputFormat, line_number: usize, line: &str, reason: &'static str) -> Self {
    Self {
      format,
      line_number,
      line: line.to_string(),
      reason,
    }
  }
}

/// Errors raised while talking to the version-control system.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
  /// The command could not be started at all.
  #[error("failed to run `{command}`: {source}")]
  Spawn {
    command: String,
    source: std::io::Error,
  },

  /// The command ran but exited unsuccessfully.
  #[error("`{command}` exited with {}: {stderr}", exit_code_display(.code))]
  Execution {
    command: String,
    code: Option<i32>,
    stderr: String,
  },

  /// The command printed something that is not UTF-8.
  #[error("`{command}` produced non UTF-8 output: {source}")]
  InvalidOutput { command: String, source: FromUtf8Error },

  /// The command output could not be understood.
  #[error(transparent)]
  Parse(#[from] ParseError),
}

impl VcsError {
  /// Whether this error comes from running the external command rather than
  /// from interpreting its output.
  pub const fn is_execution(&self) -> bool {
    !matches!(self, Self::Parse(_))
  }
}

fn exit_code_display(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("status {code}"),
    None => "no status (terminated by signal)".to_string(),
  }
}

/// The three version-control operations the core consumes.
///
/// Each operation receives the command-line arguments that follow the
/// subcommand name and returns the command's standard output verbatim.
/// Implementations must not retry; failures are returned to the caller.
pub trait Vcs {
  /// Run a diff, e.g. `diff --name-status origin/main..HEAD`.
  fn diff(&self, args: &[&str]) -> Result<String, VcsError>;

  /// Run a status query, e.g. `status --porcelain`.
  fn status(&self, args: &[&str]) -> Result<String, VcsError>;

  /// Run a log query, e.g. `log --format=%at -- path`.
  fn log(&self, args: &[&str]) -> Result<String, VcsError>;
}

impl<T: Vcs + ?Sized> Vcs for &T {
  fn diff(&self, args: &[&str]) -> Result<String, VcsError> {
    (**self).diff(args)
  }

  fn status(&self, args: &[&str]) -> Result<String, VcsError> {
    (**self).status(args)
  }

  fn log(&self, args: &[&str]) -> Result<String, VcsError> {
    (**self).log(args)
  }
}

impl<T: Vcs + ?Sized> Vcs for Box<T> {
  fn diff(&self, args: &[&str]) -> Result<String, VcsError> {
    (**self).diff(args)
  }

  fn status(&self, args: &[&str]) -> Result<String, VcsError> {
    (**self).status(args)
  }

  fn log(&self, args: &[&str]) -> Result<String, VcsError> {
    (**self).log(args)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_error_names_format_and_line() {
    let err = ParseError::new(OutputFormat::Porcelain, 3, "X", "line too short");
    let message = err.to_string();
    assert!(message.contains("porcelain status"));
    assert!(message.contains("line 3"));
    assert!(message.contains("\"X\""));
  }

  #[test]
  fn test_execution_error_display() {
    let err = VcsError::Execution {
      command: "git status --porcelain".to_string(),
      code: Some(128),
      stderr: "fatal: not a git repository".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "`git status --porcelain` exited with status 128: fatal: not a git repository"
    );
    assert!(err.is_execution());

    let killed = VcsError::Execution {
      command: "git log".to_string(),
      code: None,
      stderr: String::new(),
    };
    assert!(killed.to_string().contains("terminated by signal"));
  }

  #[test]
  fn test_parse_variant_is_not_execution() {
    let err = VcsError::from(ParseError::new(OutputFormat::Timestamps, 1, "abc", "not a timestamp"));
    assert!(!err.is_execution());
  }
}
