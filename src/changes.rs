//! # Changes Module
//!
//! Parsers that turn raw version-control output into candidate file paths.
//!
//! Two formats are understood:
//! - the name-status diff (`M\tpath`, `R099\told\tnew`, ...) listing what was
//!   committed ahead of the baseline, and
//! - the porcelain status (` M path`, `?? path`, `R  old -> new`, ...) listing
//!   what is pending in the index and the working tree.
//!
//! Deleted files are dropped (there is no header left to maintain) and renamed
//! or copied files only contribute their new path. Malformed lines are
//! rejected with a [`ParseError`] rather than skipped, since they mean the
//! output does not come from the format this module expects.

use std::borrow::Cow;

use crate::vcs::{OutputFormat, ParseError};

/// What happened to a path, as reported by diff or status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
  Modified,
  Added,
  Deleted,
  Renamed,
  Copied,
  TypeChanged,
  /// Both sides touched the path during a merge. The merge state itself is
  /// not interpreted.
  Unmerged,
  Untracked,
  Ignored,
}

impl ChangeStatus {
  /// Whether a file with this status still needs a header.
  pub const fn keeps_path(self) -> bool {
    !matches!(self, Self::Deleted | Self::Ignored)
  }

  const fn has_previous_path(self) -> bool {
    matches!(self, Self::Renamed | Self::Copied)
  }
}

/// A single parsed line of diff or status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChangeEntry {
  pub status: ChangeStatus,
  /// Path the change applies to; the new path for renames and copies.
  pub path: String,
  /// Source path of a rename or copy.
  pub previous_path: Option<String>,
}

impl RawChangeEntry {
  /// The path that should be checked for a header, if any.
  pub fn into_surviving_path(self) -> Option<String> {
    self.status.keeps_path().then_some(self.path)
  }
}

/// Parses `diff --name-status` output into the paths that still exist.
///
/// Order follows the output and duplicates are kept. Empty output yields an
/// empty list.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first line that is not a known status code
/// followed by the right number of tab-separated paths.
pub fn parse_committed_changes(diff_text: &str) -> Result<Vec<String>, ParseError> {
  Ok(
    parse_name_status(diff_text)?
      .into_iter()
      .filter_map(RawChangeEntry::into_surviving_path)
      .collect(),
  )
}

/// Parses `status --porcelain` output into the paths that still exist.
///
/// Order follows the output. Empty output yields an empty list.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first line without a valid two-column
/// status code, separator and path.
pub fn parse_uncommitted_changes(status_text: &str) -> Result<Vec<String>, ParseError> {
  Ok(
    parse_porcelain(status_text)?
      .into_iter()
      .filter_map(RawChangeEntry::into_surviving_path)
      .collect(),
  )
}

/// Parses every line of name-status output, deletions included.
pub fn parse_name_status(diff_text: &str) -> Result<Vec<RawChangeEntry>, ParseError> {
  non_blank_lines(diff_text)
    .map(|(line_number, line)| parse_name_status_line(line, line_number))
    .collect()
}

/// Parses every line of porcelain status output, deletions included.
pub fn parse_porcelain(status_text: &str) -> Result<Vec<RawChangeEntry>, ParseError> {
  non_blank_lines(status_text)
    .map(|(line_number, line)| parse_porcelain_line(line, line_number))
    .collect()
}

/// Parses one `status<TAB>path[<TAB>newpath]` line.
pub fn parse_name_status_line(line: &str, line_number: usize) -> Result<RawChangeEntry, ParseError> {
  let error = |reason| ParseError::new(OutputFormat::NameStatus, line_number, line, reason);

  let mut fields = line.split('\t');
  let code = fields.next().unwrap_or_default();
  let status = name_status_code(code).ok_or_else(|| error("unknown status code"))?;
  let paths: Vec<&str> = fields.collect();

  if paths.iter().any(|path| path.is_empty()) {
    return Err(error("empty path"));
  }

  let unquote = |raw: &str| unquote_path(raw).map(Cow::into_owned).map_err(error);

  match (status.has_previous_path(), paths.as_slice()) {
    (true, [old, new]) => Ok(RawChangeEntry {
      status,
      path: unquote(*new)?,
      previous_path: Some(unquote(*old)?),
    }),
    (true, _) => Err(error("expected a source and a destination path")),
    (false, [path]) => Ok(RawChangeEntry {
      status,
      path: unquote(*path)?,
      previous_path: None,
    }),
    (false, _) => Err(error("expected exactly one path")),
  }
}

/// Parses one `XY path` (or `XY old -> new`) porcelain line.
pub fn parse_porcelain_line(line: &str, line_number: usize) -> Result<RawChangeEntry, ParseError> {
  let error = |reason| ParseError::new(OutputFormat::Porcelain, line_number, line, reason);

  let bytes = line.as_bytes();
  if bytes.len() < 4 {
    return Err(error("expected a two-column status, a space and a path"));
  }

  let (index, worktree) = (bytes[0], bytes[1]);
  if !is_status_slot(index) || !is_status_slot(worktree) {
    return Err(error("unknown status code"));
  }
  if bytes[2] != b' ' {
    return Err(error("missing space after status code"));
  }
  let status = porcelain_status(index, worktree).ok_or_else(|| error("unknown status code"))?;

  // The first three bytes are ASCII, so index 3 is a char boundary.
  let rest = &line[3..];
  let unquote = |raw: &str| unquote_path(raw).map(Cow::into_owned).map_err(error);

  if status.has_previous_path() {
    let (old, new) = split_porcelain_rename(rest).ok_or_else(|| error("expected `old -> new` for a rename"))?;
    return Ok(RawChangeEntry {
      status,
      path: unquote(new)?,
      previous_path: Some(unquote(old)?),
    });
  }

  Ok(RawChangeEntry {
    status,
    path: unquote(rest)?,
    previous_path: None,
  })
}

/// Yields `(line_number, line)` for every line with content, 1-based.
pub(crate) fn non_blank_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
  text
    .lines()
    .enumerate()
    .map(|(index, line)| (index + 1, line))
    .filter(|(_, line)| !line.trim().is_empty())
}

/// Decodes a name-status code such as `M`, `D` or `R099`.
fn name_status_code(code: &str) -> Option<ChangeStatus> {
  let (letter, score) = code.split_at_checked(1)?;

  let status = match letter {
    "M" => ChangeStatus::Modified,
    "A" => ChangeStatus::Added,
    "D" => ChangeStatus::Deleted,
    "T" => ChangeStatus::TypeChanged,
    "U" => ChangeStatus::Unmerged,
    "R" => ChangeStatus::Renamed,
    "C" => ChangeStatus::Copied,
    _ => return None,
  };

  // Only renames and copies carry a similarity score, at most "100".
  if !score.is_empty() && (!status.has_previous_path() || score.len() > 3 || !score.bytes().all(|b| b.is_ascii_digit()))
  {
    return None;
  }

  Some(status)
}

const fn is_status_slot(byte: u8) -> bool {
  matches!(byte, b' ' | b'M' | b'T' | b'A' | b'D' | b'R' | b'C' | b'U' | b'?' | b'!')
}

/// Folds the index and worktree columns into a single status.
fn porcelain_status(index: u8, worktree: u8) -> Option<ChangeStatus> {
  let either = |code: u8| index == code || worktree == code;

  let status = match (index, worktree) {
    (b'?', b'?') => ChangeStatus::Untracked,
    (b'!', b'!') => ChangeStatus::Ignored,
    (b' ', b' ') => return None,
    _ if either(b'?') || either(b'!') => return None,
    _ if either(b'D') => ChangeStatus::Deleted,
    _ if either(b'U') => ChangeStatus::Unmerged,
    _ if either(b'R') => ChangeStatus::Renamed,
    _ if either(b'C') => ChangeStatus::Copied,
    _ if either(b'A') => ChangeStatus::Added,
    _ if either(b'T') => ChangeStatus::TypeChanged,
    _ => ChangeStatus::Modified,
  };

  Some(status)
}

/// Splits `old -> new`, honouring a quoted `old` that may contain the arrow.
fn split_porcelain_rename(rest: &str) -> Option<(&str, &str)> {
  if rest.starts_with('"') {
    let end = closing_quote(rest)?;
    let (old, tail) = rest.split_at(end + 1);
    let new = tail.strip_prefix(" -> ")?;
    return Some((old, new));
  }
  rest.split_once(" -> ")
}

/// Byte index of the quote closing a string that starts with `"`.
fn closing_quote(quoted: &str) -> Option<usize> {
  let bytes = quoted.as_bytes();
  let mut i = 1;
  while i < bytes.len() {
    match bytes[i] {
      b'\\' => i += 2,
      b'"' => return Some(i),
      _ => i += 1,
    }
  }
  None
}

/// Undoes git's C-style path quoting.
///
/// Paths with control characters, quotes, backslashes or (by default)
/// non-ASCII bytes are printed between double quotes with escapes such as
/// `\t`, `\"` and `\303\251`. Unquoted paths are returned untouched.
///
/// # Errors
///
/// Returns the reason when an escape sequence is unknown or truncated, or
/// when the unescaped bytes are not UTF-8.
pub fn unquote_path(raw: &str) -> Result<Cow<'_, str>, &'static str> {
  let Some(inner) = raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
    return Ok(Cow::Borrowed(raw));
  };

  let bytes = unescape(inner.as_bytes()).ok_or("badly quoted path")?;
  String::from_utf8(bytes)
    .map(Cow::Owned)
    .map_err(|_err| "path is not UTF-8")
}

fn unescape(src: &[u8]) -> Option<Vec<u8>> {
  let mut out = Vec::with_capacity(src.len());
  let mut i = 0;

  while i < src.len() {
    if src[i] != b'\\' {
      out.push(src[i]);
      i += 1;
      continue;
    }

    let escape = *src.get(i + 1)?;
    let decoded = match escape {
      b'a' => 0x07,
      b'b' => 0x08,
      b't' => b'\t',
      b'n' => b'\n',
      b'v' => 0x0b,
      b'f' => 0x0c,
      b'r' => b'\r',
      b'"' => b'"',
      b'\\' => b'\\',
      b'0'..=b'3' => {
        let digits = std::str::from_utf8(src.get(i + 1..i + 4)?).ok()?;
        i += 2;
        u8::from_str_radix(digits, 8).ok()?
      }
      _ => return None,
    };
    out.push(decoded);
    i += 2;
  }

  Some(out)
}
