//! # Git Module
//!
//! Production [`Vcs`] implementation that runs the `git` command line.

use std::path::PathBuf;
use std::process::Command;

use tracing::trace;

use super::{Vcs, VcsError};

/// Runs git subcommands inside a working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
  /// Directory the commands run in.
  workdir: PathBuf,
  /// Program to execute, `git` unless overridden.
  program: String,
}

impl GitCli {
  /// Creates a runner for the repository containing `workdir`.
  pub fn new(workdir: impl Into<PathBuf>) -> Self {
    Self {
      workdir: workdir.into(),
      program: "git".to_string(),
    }
  }

  /// Uses a different git executable, e.g. an absolute path.
  pub fn with_program(mut self, program: impl Into<String>) -> Self {
    self.program = program.into();
    self
  }

  /// Returns the top-level directory of the work tree containing `workdir`.
  ///
  /// # Errors
  ///
  /// Fails with [`VcsError::Execution`] when `workdir` is not inside a git
  /// work tree, or [`VcsError::Spawn`] when git is not installed.
  pub fn toplevel(&self) -> Result<PathBuf, VcsError> {
    let output = self.run("rev-parse", &["--show-toplevel"])?;
    Ok(PathBuf::from(output.trim_end_matches(['\n', '\r'])))
  }

  /// Lists every file git tracks, relative to the work tree top level.
  ///
  /// Uses NUL-separated output so paths need no unquoting.
  pub fn tracked_files(&self) -> Result<Vec<String>, VcsError> {
    let output = self.run("ls-files", &["-z", "--full-name", ":/"])?;
    Ok(split_nul(&output))
  }

  /// Lists the untracked files below `dir`, leaving out ignored ones.
  ///
  /// `dir` is relative to the work tree top level, as status reports it.
  pub fn untracked_files(&self, dir: &str) -> Result<Vec<String>, VcsError> {
    let pathspec = format!(":(top,literal){dir}");
    let output = self.run(
      "ls-files",
      &["-z", "--others", "--exclude-standard", "--full-name", "--", &pathspec],
    )?;
    Ok(split_nul(&output))
  }

  /// Runs `git <subcommand> <args...>` and returns its stdout.
  fn run(&self, subcommand: &str, args: &[&str]) -> Result<String, VcsError> {
    let command_line = self.command_line(subcommand, args);
    trace!(command = %command_line, workdir = %self.workdir.display(), "running git");

    let output = Command::new(&self.program)
      .arg(subcommand)
      .args(args)
      .current_dir(&self.workdir)
      .output()
      .map_err(|source| VcsError::Spawn {
        command: command_line.clone(),
        source,
      })?;

    if !output.status.success() {
      return Err(VcsError::Execution {
        command: command_line,
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }

    String::from_utf8(output.stdout).map_err(|source| VcsError::InvalidOutput {
      command: command_line,
      source,
    })
  }

  fn command_line(&self, subcommand: &str, args: &[&str]) -> String {
    let mut line = format!("{} {}", self.program, subcommand);
    for arg in args {
      line.push(' ');
      line.push_str(arg);
    }
    line
  }
}

fn split_nul(output: &str) -> Vec<String> {
  output
    .split('\0')
    .filter(|path| !path.is_empty())
    .map(ToString::to_string)
    .collect()
}

impl Vcs for GitCli {
  fn diff(&self, args: &[&str]) -> Result<String, VcsError> {
    self.run("diff", args)
  }

  fn status(&self, args: &[&str]) -> Result<String, VcsError> {
    self.run("status", args)
  }

  fn log(&self, args: &[&str]) -> Result<String, VcsError> {
    self.run("log", args)
  }
}
