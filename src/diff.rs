//! # Diff Module
//!
//! Renders what a header insertion or year refresh would change, for check
//! mode's `--show-diff` and `--save-diff` options.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Shows and/or saves diffs of would-be header changes.
#[derive(Debug, Default)]
pub struct DiffManager {
  /// Whether to print diffs to stderr
  pub show_diff: bool,

  /// File that collects every diff of the run
  pub save_diff_path: Option<PathBuf>,
}

impl DiffManager {
  pub const fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
    }
  }

  /// Whether diffs are wanted at all.
  pub const fn is_active(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Truncates the diff file so a run starts from an empty one.
  pub fn init(&self) -> Result<()> {
    if let Some(ref path) = self.save_diff_path {
      File::create(path).with_context(|| format!("Failed to create diff file: {}", path.display()))?;
    }
    Ok(())
  }

  /// Displays and/or saves a line diff between `original` and `new`.
  ///
  /// Diffs of every file are appended to the same save file.
  pub fn display_diff(&self, path: &Path, original: &str, new: &str) -> Result<()> {
    if !self.is_active() {
      return Ok(());
    }

    let rendered = render_diff(path, original, new);

    if self.show_diff {
      for line in rendered.lines() {
        let colored = match line.chars().next() {
          Some('+') if !line.starts_with("+++") => line.if_supports_color(Stream::Stderr, |l| l.green()).to_string(),
          Some('-') if !line.starts_with("---") => line.if_supports_color(Stream::Stderr, |l| l.red()).to_string(),
          _ => line.to_string(),
        };
        eprintln!("{colored}");
      }
    }

    if let Some(ref diff_path) = self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(rendered.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}

/// Unified diff of a single file, with `a/` and `b/` headers.
pub fn render_diff(path: &Path, original: &str, new: &str) -> String {
  let diff = TextDiff::from_lines(original, new);
  let name = path.display();

  let mut out = format!("--- a/{name}\n+++ b/{name}\n");
  for change in diff.iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => '-',
      ChangeTag::Insert => '+',
      ChangeTag::Equal => ' ',
    };
    out.push(sign);
    out.push_str(change.value());
    if change.missing_newline() {
      out.push('\n');
    }
  }
  out
}
