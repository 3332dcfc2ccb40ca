//! # Insert Command
//!
//! This module implements the check/modify command for headers.
//! This is the default command when no subcommand is specified.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use headerstamp::config::CliOverrides;
use headerstamp::diff::DiffManager;
use headerstamp::header::{
  HeaderTarget, HeaderTemplate, HeaderWriter, IncludeFilter, all_tracked_targets, expand_untracked_directories,
  targets_from_changes,
};
use headerstamp::info_log;
use headerstamp::output::{
  PathDisplay, print_all_files_ok, print_blank_line, print_failed_files, print_hint, print_results,
  print_start_message, print_summary,
};
use headerstamp::reconcile::get_vcs_changes;
use headerstamp::report::{ProcessingSummary, write_json_report};
use tracing::debug;

use super::{CommonArgs, Session, open_session};

/// Arguments for the insert command
#[derive(Args, Debug, Default, Clone)]
pub struct InsertArgs {
  /// Glob patterns, relative to the repository root, of files that carry the
  /// header. A directory selects every file below it. Defaults to every
  /// changed file.
  #[arg(required = false, value_name = "INCLUDES")]
  pub includes: Vec<String>,

  /// Header template; `{{year}}` is replaced by each file's years
  #[arg(long, short = 'f', value_name = "FILE")]
  pub header_file: Option<PathBuf>,

  /// Dry run mode: only check headers without modifying files (default)
  #[arg(long, group = "mode", hide = true)]
  pub dry_run: bool,

  /// Modify mode: add or update headers in files
  #[arg(
    long,
    group = "mode",
    help = "Modify mode: add or update headers in files

[default: --dry-run]"
  )]
  pub modify: bool,

  /// Show diff of changes in dry run mode
  #[arg(long)]
  pub show_diff: bool,

  /// Save diff of changes to a file in dry run mode
  #[arg(long, short = 'o', value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Process every tracked file matching the includes, not only changed ones
  #[arg(long)]
  pub all: bool,

  /// Write a JSON report of every processed file to the given path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  #[command(flatten)]
  pub common: CommonArgs,
}

impl InsertArgs {
  fn overrides(&self) -> Result<CliOverrides> {
    // Relative to where the command runs, unlike `header-file` in the config.
    let header_file = match &self.header_file {
      Some(path) => Some(std::path::absolute(path).with_context(|| format!("Invalid path {}", path.display()))?),
      None => None,
    };

    Ok(CliOverrides {
      header_file,
      includes: self.includes.clone(),
      ..self.common.overrides()
    })
  }
}

/// Run the insert command with the given arguments
pub async fn run_insert(args: InsertArgs) -> Result<()> {
  args.common.init_output();

  let session = open_session(&args.common, args.overrides()?)?;
  let Session {
    workspace,
    config,
    clock,
    current_dir,
  } = &session;
  let root = workspace.root();

  let Some(header_file) = config.header_file.as_ref().map(|path| root.join(path)) else {
    eprintln!("ERROR: Missing required argument: --header-file <FILE>");
    process::exit(1);
  };

  let template = HeaderTemplate::load(&header_file)
    .with_context(|| format!("Failed to load header template from {}", header_file.display()))?;
  let filter = IncludeFilter::new(&config.includes).with_context(|| "Invalid include pattern")?;

  let targets = if args.all {
    let tracked = workspace.git().tracked_files()?;
    all_tracked_targets(root, &tracked, &filter, workspace.git(), &**clock)?
  } else {
    let baseline = config.baseline();
    let changes = get_vcs_changes(
      workspace.git(),
      &**clock,
      &baseline,
      config.changes.exclude_untracked,
    )
    .with_context(|| format!("Failed to list changes relative to {baseline}"))?;
    let changes = expand_untracked_directories(workspace.git(), changes, &**clock)
      .with_context(|| "Failed to list files in untracked directories")?;
    info_log!("Found {} changed files relative to {}", changes.len(), baseline);
    targets_from_changes(root, &changes, &filter)
  };
  let targets = without_template(targets, &header_file);

  let check_only = args.dry_run || !args.modify;

  let diff_manager = DiffManager::new(args.show_diff, args.save_diff);
  diff_manager.init()?;

  print_start_message(targets.len(), !check_only);

  if targets.is_empty() {
    print_blank_line();
    print_all_files_ok();
    return Ok(());
  }

  let start_time = Instant::now();

  let writer = HeaderWriter::new(template, check_only).with_diff_manager(diff_manager);
  let reports = writer.process(targets).await;

  let summary = ProcessingSummary::from_reports(&reports, start_time.elapsed());
  let paths = PathDisplay::new(root, current_dir.as_deref());

  print_blank_line();
  if summary.changed() == 0 && summary.failed == 0 {
    print_all_files_ok();
  } else {
    print_results(&reports, !check_only, &paths);
    print_failed_files(&reports, &paths);
  }

  print_blank_line();
  print_summary(&summary);

  if check_only && summary.changed() > 0 {
    print_blank_line();
    let hint = match (summary.headers_added > 0, summary.years_updated > 0) {
      (true, true) => "Run with --modify to add missing headers and update years.",
      (true, false) => "Run with --modify to add missing headers.",
      _ => "Run with --modify to update outdated years.",
    };
    print_hint(hint);
  }

  if let Some(ref output_path) = args.report_json {
    if let Err(e) = write_json_report(output_path, &reports, &summary, check_only) {
      eprintln!("Error generating JSON report: {e:#}");
    } else {
      info_log!("Generated JSON report at {}", output_path.display());
    }
  }

  if summary.failed > 0 || (check_only && summary.changed() > 0) {
    process::exit(1);
  }

  Ok(())
}

/// Drops the header template itself from the targets.
fn without_template(targets: Vec<HeaderTarget>, header_file: &std::path::Path) -> Vec<HeaderTarget> {
  let Ok(template) = header_file.canonicalize() else {
    return targets;
  };

  targets
    .into_iter()
    .filter(|target| {
      let is_template = target.path.canonicalize().is_ok_and(|path| path == template);
      if is_template {
        debug!("Skipping header template {}", target.display_path);
      }
      !is_template
    })
    .collect()
}
