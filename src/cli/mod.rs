//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing; `insert` is the default command and
//! `changes` prints the change set it works from.

mod changes;
mod insert;

use std::path::PathBuf;

use anyhow::{Context, Result};
pub use changes::{ChangesArgs, run_changes};
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Args, Parser, Subcommand};
use headerstamp::clock::{Clock, FixedClock, SystemClock};
use headerstamp::config::{CliOverrides, Config, load_config};
use headerstamp::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use headerstamp::workspace::{Workspace, resolve_current_workspace};
pub use insert::{InsertArgs, run_insert};
use tracing::debug;

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  args_conflicts_with_subcommands = true,
  after_help = "Examples:
  # Check the headers of files changed since origin/main
  headerstamp --header-file license-header.txt

  # Add or refresh those headers
  headerstamp --modify --header-file license-header.txt

  # Only Go files, measured against upstream/develop
  headerstamp --remote upstream --branch develop --header-file header.txt \"**/*.go\"

  # Show diff of potential changes without modifying files
  headerstamp --show-diff --header-file license-header.txt

  # Every tracked file under src/, not only changed ones
  headerstamp --all --modify --header-file license-header.txt src/

  # List the changed files with their copyright years
  headerstamp changes --format json
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,

  #[command(flatten)]
  pub insert_args: InsertArgs,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
  /// Check and optionally write headers of changed files (default)
  Insert(InsertArgs),
  /// Print the files changed relative to the baseline, with their years
  Changes(ChangesArgs),
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

/// Options shared by every command
#[derive(Args, Debug, Default, Clone)]
pub struct CommonArgs {
  /// Path to config file (default: .headerstamp.toml in the repository root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Remote holding the baseline branch [default: origin]
  #[arg(long, value_name = "NAME")]
  pub remote: Option<String>,

  /// Baseline branch that committed changes are measured against [default:
  /// main]
  #[arg(long, value_name = "NAME")]
  pub branch: Option<String>,

  /// Leave out files git does not track yet
  #[arg(long)]
  pub exclude_untracked: bool,

  /// Use this Unix timestamp as the current time
  #[arg(long, value_name = "UNIX_TS", allow_negative_numbers = true)]
  pub now: Option<i64>,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl CommonArgs {
  /// Sets up tracing, the output mode and colours.
  fn init_output(&self) {
    init_tracing(self.quiet, self.verbose);

    if self.verbose > 0 {
      set_verbose();
    } else if self.quiet {
      set_quiet();
    }
    self.colors.apply();
  }

  fn clock(&self) -> Result<Box<dyn Clock>> {
    match self.now {
      Some(timestamp) => {
        let clock =
          FixedClock::from_unix(timestamp).with_context(|| format!("--now {timestamp} is not a valid timestamp"))?;
        debug!("Using fixed clock: {}", clock.now());
        Ok(Box::new(clock))
      }
      None => Ok(Box::new(SystemClock)),
    }
  }

  fn overrides(&self) -> CliOverrides {
    CliOverrides {
      remote: self.remote.clone(),
      branch: self.branch.clone(),
      exclude_untracked: self.exclude_untracked,
      ..CliOverrides::default()
    }
  }
}

/// Everything a command needs once arguments are parsed.
pub struct Session {
  pub workspace: Workspace,
  pub config: Config,
  pub clock: Box<dyn Clock>,
  pub current_dir: Option<PathBuf>,
}

/// Resolves the repository, loads the config and applies `overrides` on top.
fn open_session(common: &CommonArgs, overrides: CliOverrides) -> Result<Session> {
  let workspace = resolve_current_workspace()?;

  let mut config = load_config(common.config.as_deref(), workspace.root(), common.no_config)?;
  config.merge_cli_overrides(overrides);
  config.validate().with_context(|| "Invalid command-line options")?;

  let current_dir = std::env::current_dir()
    .ok()
    .map(|dir| dir.canonicalize().unwrap_or(dir));

  Ok(Session {
    workspace,
    config,
    clock: common.clock()?,
    current_dir,
  })
}
