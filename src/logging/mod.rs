//! # Logging Module
//!
//! Logging utilities for headerstamp:
//! - structured diagnostics through `tracing`, see [`init_tracing`]
//! - verbose logging that can be enabled/disabled
//! - standard info logging with color support
//!
//! Verbose logs go to stderr and info logs go to stdout, so the change list
//! printed on stdout stays clean for pipelines.
//!
//! ## Example
//!
//! ```rust
//! use headerstamp::logging::{ColorMode, set_verbose};
//! use headerstamp::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Never.apply();
//!
//! verbose_log!("Resolving history of: {}", "src/lib.rs");
//! info_log!("Header added to: {}", "src/lib.rs");
//! ```

mod modes;

pub use modes::{ColorMode, default_directive, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
///
/// Uses the same format string syntax as [`eprintln!`].
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
///
/// Uses the same format string syntax as [`println!`].
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Prints an info line in yellow when colours are enabled.
///
/// Used by [`info_log!`]; call the macro instead.
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
