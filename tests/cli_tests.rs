mod common;

use std::fs;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use common::{build_sample_repo, is_git_available};
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

const HEADER: &str = "// Copyright {{year}} Acme\n";

// 2020-09-13
const NOW: &str = "1600000000";

/// A sample repository plus a header template kept outside of it.
struct Fixture {
  repo: TempDir,
  header_dir: TempDir,
}

impl Fixture {
  fn new() -> Result<Self> {
    let repo = tempdir()?;
    build_sample_repo(repo.path())?;

    let header_dir = tempdir()?;
    fs::write(header_dir.path().join("header.txt"), HEADER)?;

    Ok(Self { repo, header_dir })
  }

  fn header(&self) -> String {
    self.header_dir.path().join("header.txt").display().to_string()
  }

  fn read(&self, file: &str) -> String {
    fs::read_to_string(self.repo.path().join(file)).expect("read repository file")
  }

  /// `headerstamp` run from the repository root with a fixed clock.
  fn command(&self) -> Command {
    let mut command = Command::cargo_bin("headerstamp").expect("binary is built");
    command
      .current_dir(self.repo.path())
      .env_remove("HEADERSTAMP_CONFIG")
      .env_remove("RUST_LOG");
    command
  }

  fn insert(&self) -> Command {
    let mut command = self.command();
    command
      .arg("--header-file")
      .arg(self.header())
      .args(["--now", NOW, "--colors", "never"]);
    command
  }
}

fn skip_without_git() -> bool {
  if is_git_available() {
    return false;
  }
  println!("Skipping CLI test because git command is not available");
  true
}

#[test]
fn test_changes_text_listing() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  fixture
    .command()
    .args(["changes", "--now", NOW])
    .assert()
    .success()
    .stdout(predicate::str::contains("old.go\t2017-2018\n"))
    .stdout(predicate::str::contains("core/moved.go\t2018-2020\n"))
    .stdout(predicate::str::contains("new.sh\t2020\n"))
    .stdout(predicate::str::contains("deleted.go").not());

  Ok(())
}

#[test]
fn test_changes_json_listing() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  let output = fixture
    .command()
    .args(["changes", "--format", "json", "--exclude-untracked", "--now", NOW])
    .output()?;
  assert!(output.status.success());

  let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let entries = value.as_array().expect("a JSON array");
  assert_eq!(entries.len(), 2);
  assert!(entries.iter().any(|e| e["path"] == "old.go" && e["creation_year"] == 2017 && e["last_edition_year"] == 2018));
  assert!(entries.iter().all(|e| e["path"] != "new.sh"));

  Ok(())
}

#[test]
fn test_check_mode_reports_and_fails_without_writing() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  fixture
    .insert()
    .assert()
    .code(1)
    .stdout(predicate::str::contains("3 files missing headers"))
    .stdout(predicate::str::contains("old.go (2017-2018)"))
    .stdout(predicate::str::contains("Run with --modify"));

  assert_eq!(fixture.read("old.go"), "package old\n\nfunc Old() {}\n");

  Ok(())
}

#[test]
fn test_modify_writes_headers_and_second_run_is_clean() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  fixture
    .insert()
    .arg("--modify")
    .assert()
    .success()
    .stdout(predicate::str::contains("Added header to 3 files"));

  assert_eq!(
    fixture.read("old.go"),
    "// Copyright 2017-2018 Acme\npackage old\n\nfunc Old() {}\n"
  );
  assert_eq!(fixture.read("core/moved.go"), "// Copyright 2018-2020 Acme\npackage moved\n");
  assert_eq!(fixture.read("new.sh"), "#!/bin/sh\n// Copyright 2020 Acme\necho new\n");

  fixture
    .insert()
    .assert()
    .success()
    .stdout(predicate::str::contains("All files have up-to-date headers."));

  Ok(())
}

#[test]
fn test_new_file_in_new_directory_gets_header() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;
  fs::create_dir_all(fixture.repo.path().join("pkg"))?;
  fs::write(fixture.repo.path().join("pkg/new.go"), "package pkg\n")?;

  fixture
    .insert()
    .arg("pkg")
    .assert()
    .code(1)
    .stdout(predicate::str::contains("pkg/new.go (2020)"));

  fixture.insert().args(["--modify", "pkg"]).assert().success();

  assert_eq!(fixture.read("pkg/new.go"), "// Copyright 2020 Acme\npackage pkg\n");

  Ok(())
}

#[test]
fn test_stale_years_are_refreshed() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;
  fs::write(
    fixture.repo.path().join("old.go"),
    "// Copyright 2017 Acme\npackage old\n\nfunc Old() {}\n",
  )?;

  fixture
    .insert()
    .args(["--modify", "old.go"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated years in 1 file"));

  assert_eq!(
    fixture.read("old.go"),
    "// Copyright 2017-2018 Acme\npackage old\n\nfunc Old() {}\n"
  );

  Ok(())
}

#[test]
fn test_include_patterns_limit_targets() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  fixture.insert().args(["--modify", "*.go"]).assert().success();

  assert!(fixture.read("old.go").starts_with("// Copyright"));
  assert_eq!(fixture.read("core/moved.go"), "package moved\n");
  assert_eq!(fixture.read("new.sh"), "#!/bin/sh\necho new\n");

  Ok(())
}

#[test]
fn test_config_file_supplies_header_and_includes() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;
  let repo = fixture.repo.path();
  fs::write(repo.join("header.txt"), HEADER)?;
  fs::write(
    repo.join(".headerstamp.toml"),
    "header-file = \"header.txt\"\nincludes = [\"core\"]\n",
  )?;

  fixture
    .command()
    .args(["--modify", "--now", NOW])
    .assert()
    .success();

  assert_eq!(fixture.read("core/moved.go"), "// Copyright 2018-2020 Acme\npackage moved\n");
  assert_eq!(fixture.read("old.go"), "package old\n\nfunc Old() {}\n");
  assert_eq!(fixture.read("header.txt"), HEADER);

  Ok(())
}

#[test]
fn test_header_template_is_never_a_target() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;
  let repo = fixture.repo.path();
  fs::write(repo.join("header.txt"), HEADER)?;

  fixture
    .command()
    .args(["--modify", "--header-file", "header.txt", "--now", NOW])
    .assert()
    .success();

  assert_eq!(fixture.read("header.txt"), HEADER);
  assert!(fixture.read("old.go").starts_with("// Copyright 2017-2018 Acme"));

  Ok(())
}

#[test]
fn test_all_processes_unchanged_tracked_files() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;
  let repo = fixture.repo.path();
  common::commit_file_at(repo, "stable/keep.go", "package stable\n", common::TS_2017)?;
  common::mark_baseline(repo)?;

  fixture.insert().args(["--modify", "stable"]).assert().success();
  assert_eq!(fixture.read("stable/keep.go"), "package stable\n");

  fixture
    .insert()
    .args(["--modify", "--all", "stable"])
    .assert()
    .success();
  // A single commit in 2017, so the range runs up to the current year.
  assert_eq!(fixture.read("stable/keep.go"), "// Copyright 2017-2020 Acme\npackage stable\n");

  Ok(())
}

#[test]
fn test_save_diff_in_check_mode() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;
  let diff_path = fixture.header_dir.path().join("changes.diff");

  fixture
    .insert()
    .arg("--save-diff")
    .arg(&diff_path)
    .assert()
    .code(1);

  let diff = fs::read_to_string(&diff_path)?;
  assert!(diff.contains("+++ b/old.go"));
  assert!(diff.contains("+// Copyright 2017-2018 Acme"));
  assert_eq!(fixture.read("old.go"), "package old\n\nfunc Old() {}\n");

  Ok(())
}

#[test]
fn test_quiet_check_prints_only_paths() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  let output = fixture.insert().args(["-q", "*.go"]).output()?;

  assert_eq!(output.status.code(), Some(1));
  assert_eq!(String::from_utf8(output.stdout)?, "old.go\n");

  Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;
  let report_path = fixture.header_dir.path().join("report.json");

  fixture
    .insert()
    .arg("--modify")
    .arg("--report-json")
    .arg(&report_path)
    .assert()
    .success();

  let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report_path)?)?;
  assert_eq!(report["check_only"], false);
  assert_eq!(report["summary"]["headers_added"], 3);

  Ok(())
}

#[test]
fn test_missing_header_file_is_an_error() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  fixture
    .command()
    .arg("--no-config")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Missing required argument: --header-file"));

  Ok(())
}

#[test]
fn test_unknown_baseline_fails() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  fixture
    .insert()
    .args(["--remote", "nowhere"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("nowhere/main"));

  Ok(())
}

#[test]
fn test_outside_repository_fails() -> Result<()> {
  let dir = tempdir()?;

  Command::cargo_bin("headerstamp")?
    .current_dir(dir.path())
    .args(["changes"])
    .assert()
    .failure();

  Ok(())
}

#[test]
fn test_help_lists_subcommands() -> Result<()> {
  Command::cargo_bin("headerstamp")?
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("changes"))
    .stdout(predicate::str::contains("--header-file"));

  Ok(())
}

#[test]
fn test_color_modes() -> Result<()> {
  if skip_without_git() {
    return Ok(());
  }
  let fixture = Fixture::new()?;

  let plain = fixture.insert().output()?;
  assert!(!String::from_utf8(plain.stdout)?.contains("\x1b["));

  let colored = fixture
    .command()
    .arg("--header-file")
    .arg(fixture.header())
    .args(["--now", NOW, "--colors=always"])
    .output()?;
  assert!(String::from_utf8(colored.stdout)?.contains("\x1b["));

  Ok(())
}
