#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use headerstamp::vcs::{Vcs, VcsError};

/// 2017-07-12
pub const TS_2017: i64 = 1_499_817_600;
/// 2018-09-26
pub const TS_2018: i64 = 1_537_974_554;
/// 2020-09-13, used as "now"
pub const TS_2020: i64 = 1_600_000_000;

/// Checks if git is available on the system.
pub fn is_git_available() -> bool {
  Command::new("git").arg("--version").status().is_ok()
}

/// Runs a git command in the given directory, returning an error with stderr on
/// failure.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
  run_git_with_env(dir, args, &[])
}

fn run_git_with_env(dir: &Path, args: &[&str], env: &[(&str, String)]) -> Result<()> {
  let mut command = Command::new("git");
  command.args(args).current_dir(dir);
  for (key, value) in env {
    command.env(key, value);
  }

  let output = command
    .output()
    .with_context(|| format!("Failed to execute git {:?}", args))?;

  if !output.status.success() {
    anyhow::bail!("git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
  }
  Ok(())
}

/// Initializes a git repository in the given directory with deterministic
/// settings.
///
/// Configures:
/// - Branch name `main`
/// - User name and email for commits
/// - Disables commit signing for test isolation
pub fn init_git_repo(dir: &Path) -> Result<()> {
  run_git(dir, &["init", "-q"])?;
  run_git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
  run_git(dir, &["config", "user.name", "Test User"])?;
  run_git(dir, &["config", "user.email", "test@example.com"])?;
  run_git(dir, &["config", "commit.gpgsign", "false"])?;
  Ok(())
}

/// Commits everything staged, dated at the given Unix timestamp.
pub fn git_commit_at(dir: &Path, message: &str, timestamp: i64) -> Result<()> {
  let date = format!("{timestamp} +0000");
  run_git_with_env(
    dir,
    &["commit", "-q", "-m", message],
    &[("GIT_AUTHOR_DATE", date.clone()), ("GIT_COMMITTER_DATE", date)],
  )
}

/// Writes a file, stages it and commits it at the given timestamp.
pub fn commit_file_at(dir: &Path, file: &str, content: &str, timestamp: i64) -> Result<()> {
  let path = dir.join(file);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&path, content)?;
  run_git(dir, &["add", file])?;
  git_commit_at(dir, &format!("Update {file}"), timestamp)
}

/// Points `origin/main` at the current `HEAD`, as if it had just been pushed.
pub fn mark_baseline(dir: &Path) -> Result<()> {
  run_git(dir, &["update-ref", "refs/remotes/origin/main", "HEAD"])
}

/// Builds the repository most integration tests share:
///
/// - at the baseline (2017): `old.go`, `deleted.go`, `moved.go`
/// - committed since (2018): `old.go` edited, `deleted.go` removed,
///   `moved.go` renamed to `core/moved.go`
/// - uncommitted: `new.sh` untracked
pub fn build_sample_repo(dir: &Path) -> Result<()> {
  init_git_repo(dir)?;
  commit_file_at(dir, "old.go", "package old\n", TS_2017)?;
  commit_file_at(dir, "deleted.go", "package deleted\n", TS_2017)?;
  commit_file_at(dir, "moved.go", "package moved\n", TS_2017)?;
  mark_baseline(dir)?;

  commit_file_at(dir, "old.go", "package old\n\nfunc Old() {}\n", TS_2018)?;
  run_git(dir, &["rm", "-q", "deleted.go"])?;
  git_commit_at(dir, "Remove deleted.go", TS_2018)?;
  std::fs::create_dir_all(dir.join("core"))?;
  run_git(dir, &["mv", "moved.go", "core/moved.go"])?;
  git_commit_at(dir, "Move moved.go", TS_2018)?;

  std::fs::write(dir.join("new.sh"), "#!/bin/sh\necho new\n")?;
  Ok(())
}

/// A [`Vcs`] answering with canned text and recording every call.
#[derive(Default)]
pub struct ScriptedVcs {
  diff: Option<String>,
  status: Option<String>,
  logs: HashMap<String, String>,
  failing: Vec<&'static str>,
  pub calls: RefCell<Vec<(&'static str, Vec<String>)>>,
}

impl ScriptedVcs {
  pub fn new(diff: &str, status: &str) -> Self {
    Self {
      diff: Some(diff.to_string()),
      status: Some(status.to_string()),
      ..Self::default()
    }
  }

  /// Log output for one path; paths without one have no commits.
  pub fn with_log(mut self, path: &str, log: &str) -> Self {
    self.logs.insert(path.to_string(), log.to_string());
    self
  }

  /// Makes an operation (`diff`, `status` or `log`) fail.
  pub fn failing(mut self, operation: &'static str) -> Self {
    self.failing.push(operation);
    self
  }

  pub fn operations(&self) -> Vec<&'static str> {
    self.calls.borrow().iter().map(|(op, _)| *op).collect()
  }

  fn answer(&self, operation: &'static str, args: &[&str], text: Option<&String>) -> Result<String, VcsError> {
    self
      .calls
      .borrow_mut()
      .push((operation, args.iter().map(ToString::to_string).collect()));

    if self.failing.contains(&operation) {
      return Err(VcsError::Execution {
        command: format!("git {operation}"),
        code: Some(128),
        stderr: "fatal: scripted failure".to_string(),
      });
    }
    Ok(text.cloned().unwrap_or_default())
  }
}

impl Vcs for ScriptedVcs {
  fn diff(&self, args: &[&str]) -> Result<String, VcsError> {
    self.answer("diff", args, self.diff.as_ref())
  }

  fn status(&self, args: &[&str]) -> Result<String, VcsError> {
    self.answer("status", args, self.status.as_ref())
  }

  fn log(&self, args: &[&str]) -> Result<String, VcsError> {
    let path = args.last().copied().unwrap_or_default();
    self.answer("log", args, self.logs.get(path))
  }
}
