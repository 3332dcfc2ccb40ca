use std::sync::atomic::{AtomicU8, Ordering};

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Global output mode, `Normal` until [`set_verbose`] or [`set_quiet`] is
/// called.
static OUTPUT_MODE: AtomicU8 = AtomicU8::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
  Normal = 0,
  Quiet = 1,
  Verbose = 2,
}

impl OutputMode {
  const fn from_u8(value: u8) -> Self {
    match value {
      1 => OutputMode::Quiet,
      2 => OutputMode::Verbose,
      _ => OutputMode::Normal,
    }
  }

  fn current() -> Self {
    Self::from_u8(OUTPUT_MODE.load(Ordering::SeqCst))
  }
}

/// When to colour terminal output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
  /// Colour when the stream is a terminal
  #[default]
  Auto,
  /// Never use colors
  Never,
  /// Always use colors
  Always,
}

impl ColorMode {
  /// Makes every `if_supports_color` call in the process follow this mode.
  pub fn apply(self) {
    match self {
      ColorMode::Auto => owo_colors::unset_override(),
      ColorMode::Never => owo_colors::set_override(false),
      ColorMode::Always => owo_colors::set_override(true),
    }
  }
}

/// Enables verbose output for [`verbose_log!`](crate::verbose_log).
pub fn set_verbose() {
  OUTPUT_MODE.store(OutputMode::Verbose as u8, Ordering::SeqCst);
}

/// Silences [`info_log!`](crate::info_log) and other non-error output.
pub fn set_quiet() {
  OUTPUT_MODE.store(OutputMode::Quiet as u8, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
  OutputMode::current() == OutputMode::Verbose
}

pub fn is_quiet() -> bool {
  OutputMode::current() == OutputMode::Quiet
}

/// Filter directive derived from `-q` and the number of `-v` flags.
pub const fn default_directive(quiet: bool, verbosity: u8) -> &'static str {
  if quiet {
    return "error";
  }
  match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  }
}

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the level derived from the flags. Calling
/// this twice is harmless; the second subscriber is ignored.
pub fn init_tracing(quiet: bool, verbosity: u8) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new(default_directive(quiet, verbosity)));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_directive() {
    assert_eq!(default_directive(true, 3), "error");
    assert_eq!(default_directive(false, 0), "warn");
    assert_eq!(default_directive(false, 1), "info");
    assert_eq!(default_directive(false, 2), "debug");
    assert_eq!(default_directive(false, 9), "trace");
  }

  #[test]
  fn test_output_mode_from_u8_defaults_to_normal() {
    assert_eq!(OutputMode::from_u8(0), OutputMode::Normal);
    assert_eq!(OutputMode::from_u8(42), OutputMode::Normal);
  }
}
