//! # Changes Command
//!
//! Prints the files changed relative to the baseline branch, each with the
//! years its header should carry.

use anyhow::{Context, Result};
use clap::Args;
use headerstamp::output::{ChangesFormat, print_changes};
use headerstamp::reconcile::get_vcs_changes;
use headerstamp::verbose_log;

use super::{CommonArgs, open_session};

/// Arguments for the changes command
#[derive(Args, Debug, Default, Clone)]
pub struct ChangesArgs {
  /// Output format
  #[arg(long, value_enum, default_value_t = ChangesFormat::Text)]
  pub format: ChangesFormat,

  #[command(flatten)]
  pub common: CommonArgs,
}

/// Run the changes command with the given arguments
pub fn run_changes(args: ChangesArgs) -> Result<()> {
  args.common.init_output();

  let session = open_session(&args.common, args.common.overrides())?;
  let baseline = session.config.baseline();

  let changes = get_vcs_changes(
    session.workspace.git(),
    &*session.clock,
    &baseline,
    session.config.changes.exclude_untracked,
  )
  .with_context(|| format!("Failed to list changes relative to {baseline}"))?;

  verbose_log!("Found {} changed files relative to {}", changes.len(), baseline);

  print_changes(&changes, args.format)
}
