//! # Workspace Module
//!
//! This module defines the workspace root that headerstamp operates on: the
//! top level of the git work tree, which every path reported by git is
//! relative to.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::vcs::GitCli;

/// A git work tree and the runner bound to it.
#[derive(Debug, Clone)]
pub struct Workspace {
  root: PathBuf,
  git: GitCli,
}

impl Workspace {
  pub fn root(&self) -> &Path {
    &self.root
  }

  pub const fn git(&self) -> &GitCli {
    &self.git
  }
}

/// Resolve the workspace containing `start`.
///
/// # Errors
///
/// Fails when `start` is not inside a git work tree or git cannot be run.
pub fn resolve_workspace(start: &Path) -> Result<Workspace> {
  let toplevel = GitCli::new(start)
    .toplevel()
    .with_context(|| format!("{} is not inside a git work tree", start.display()))?;

  // Prefer the canonical form so paths produced by globbing strip cleanly.
  let root = toplevel.canonicalize().unwrap_or(toplevel);
  debug!("Using workspace root: {}", root.display());

  Ok(Workspace {
    git: GitCli::new(&root),
    root,
  })
}

/// Resolve the workspace containing the current directory.
pub fn resolve_current_workspace() -> Result<Workspace> {
  let current_dir = std::env::current_dir().with_context(|| "Failed to get current directory")?;
  resolve_workspace(&current_dir)
}
