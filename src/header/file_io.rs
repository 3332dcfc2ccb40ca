//! # File I/O Module
//!
//! Async reads and writes of the files whose headers are checked.

use std::path::Path;

use anyhow::{Context, Result};

/// File I/O operations for the header writer.
pub struct FileIO;

impl FileIO {
  /// Reads a whole file as UTF-8.
  ///
  /// Files that are not valid UTF-8 are rejected rather than rewritten lossily.
  pub async fn read_content(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
      .await
      .with_context(|| format!("Failed to read file: {}", path.display()))?;

    String::from_utf8(bytes).with_context(|| format!("File is not valid UTF-8: {}", path.display()))
  }

  /// Replaces a file's content.
  pub async fn write_content(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content)
      .await
      .with_context(|| format!("Failed to write file: {}", path.display()))
  }
}
