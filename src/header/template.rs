//! # Header Template Module
//!
//! Loads the header text, fills in the `{{year}}` placeholder and decides what
//! a file needs: nothing, a fresh header, or a year refresh of the header it
//! already carries.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::history::YearRange;
use crate::verbose_log;

/// Placeholder replaced by the year or year range of each file.
pub const YEAR_PLACEHOLDER: &str = "{{year}}";

/// A year or year range as it may appear in an existing header.
const YEAR_RANGE_PATTERN: &str = r"\d{4}(?:[ \t]*-[ \t]*\d{4})?";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
  #[error("Failed to read header template '{path}': {source}")]
  Read { path: PathBuf, source: std::io::Error },

  #[error("Header template '{path}' is empty")]
  Empty { path: PathBuf },

  #[error("Header template cannot be matched against files: {0}")]
  Pattern(#[from] regex::Error),
}

/// What applying the header to a file's content amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderUpdate {
  /// The file already starts with the right header.
  Unchanged,
  /// The file had no header; `content` has it prepended.
  Added { content: String },
  /// The file had the header with other years.
  YearsUpdated {
    /// Year text found in the file, e.g. `2017-2018`.
    previous: String,
    /// Years now written.
    years: YearRange,
    content: String,
  },
}

impl HeaderUpdate {
  /// The new file content, if it differs from the old one.
  pub fn content(&self) -> Option<&str> {
    match self {
      Self::Unchanged => None,
      Self::Added { content } | Self::YearsUpdated { content, .. } => Some(content),
    }
  }
}

/// Header text with an optional `{{year}}` placeholder.
#[derive(Debug, Clone)]
pub struct HeaderTemplate {
  text: String,
  /// Matches the header at the start of a file whatever years it carries.
  existing_header: Option<Regex>,
}

impl HeaderTemplate {
  /// Builds a template from its text. Trailing newlines are dropped; a single
  /// newline always separates the header from the file content.
  pub fn new(text: impl Into<String>) -> Result<Self, TemplateError> {
    let mut text = text.into().replace("\r\n", "\n");
    let trimmed_len = text.trim_end_matches(['\n', '\r']).len();
    text.truncate(trimmed_len);

    let existing_header = existing_header_pattern(&text)?;
    Ok(Self { text, existing_header })
  }

  /// Loads a template from a file.
  pub fn load(path: &Path) -> Result<Self, TemplateError> {
    verbose_log!("Loading header template from: {}", path.display());

    let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    if text.trim().is_empty() {
      return Err(TemplateError::Empty {
        path: path.to_path_buf(),
      });
    }

    Self::new(text)
  }

  /// Renders the header for a file with the given years.
  pub fn render(&self, years: YearRange) -> String {
    self.text.replace(YEAR_PLACEHOLDER, &years.to_string())
  }

  fn render_with_line_ending(&self, years: YearRange, eol: &str) -> String {
    let rendered = self.render(years);
    if eol == "\n" {
      rendered
    } else {
      rendered.replace('\n', eol)
    }
  }

  /// Works out how `content` must change to start with the header.
  ///
  /// A leading shebang line stays first and the header takes the file's line
  /// ending. If the file already carries the header with different years,
  /// only the years are rewritten, widened to cover the years it showed.
  pub fn apply(&self, content: &str, years: YearRange) -> HeaderUpdate {
    let (prefix, body) = split_shebang(content);
    let eol = line_ending(content);
    let rendered = self.render_with_line_ending(years, eol);

    if starts_with_header(body, &rendered) {
      return HeaderUpdate::Unchanged;
    }

    if let Some(captures) = self.existing_header.as_ref().and_then(|re| re.captures(body))
      && let (Some(header), Some(previous)) = (captures.name("header"), captures.name("year"))
    {
      let effective = previous
        .as_str()
        .parse::<YearRange>()
        .map_or(years, |existing| years.covering(existing));
      let refreshed = self.render_with_line_ending(effective, eol);

      if header.as_str() == refreshed {
        return HeaderUpdate::Unchanged;
      }

      return HeaderUpdate::YearsUpdated {
        previous: previous.as_str().to_string(),
        years: effective,
        content: format!("{prefix}{refreshed}{}", &body[header.end()..]),
      };
    }

    HeaderUpdate::Added {
      content: format!("{prefix}{rendered}{eol}{body}"),
    }
  }
}

/// Whether `body` begins with `header` as a whole block of lines.
fn starts_with_header(body: &str, header: &str) -> bool {
  body
    .strip_prefix(header)
    .is_some_and(|rest| rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n"))
}

/// `\r\n` when the first line of `content` ends with it, `\n` otherwise.
fn line_ending(content: &str) -> &'static str {
  match content.find('\n') {
    Some(end) if content[..end].ends_with('\r') => "\r\n",
    _ => "\n",
  }
}

/// Splits off a `#!` line, which must stay the first line of a script.
fn split_shebang(content: &str) -> (&str, &str) {
  if !content.starts_with("#!") {
    return ("", content);
  }
  match content.find('\n') {
    Some(end) => content.split_at(end + 1),
    None => (content, ""),
  }
}

/// Regex matching the template at the start of a file with any years.
///
/// The first placeholder is captured as `year`, the whole header as `header`.
/// Line breaks match both `\n` and `\r\n`.
fn existing_header_pattern(text: &str) -> Result<Option<Regex>, regex::Error> {
  if !text.contains(YEAR_PLACEHOLDER) {
    return Ok(None);
  }

  let mut pattern = String::from(r"\A(?P<header>");
  for (index, literal) in text.split(YEAR_PLACEHOLDER).enumerate() {
    match index {
      0 => {}
      1 => pattern.push_str(&format!("(?P<year>{YEAR_RANGE_PATTERN})")),
      _ => pattern.push_str(&format!("(?:{YEAR_RANGE_PATTERN})")),
    }
    pattern.push_str(&regex::escape(literal).replace('\n', r"\r?\n"));
  }
  pattern.push_str(r")(?:\r?\n|\z)");

  Regex::new(&pattern).map(Some)
}
