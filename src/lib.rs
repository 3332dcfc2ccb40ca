//! # headerstamp
//!
//! A tool that keeps license headers in source files, with copyright years
//! taken from the git history of the files that changed.
//!
//! `headerstamp` asks git which files differ from a baseline remote branch
//! (committed on `HEAD` or still uncommitted), works out the year each of
//! them was created and last edited, and inserts or refreshes the header of
//! those files only.
//!
//! ## Features
//!
//! * Change discovery from `git diff --name-status`, `git status --porcelain`
//!   and `git log`, with renames followed and deletions dropped
//! * Year ranges (`2017-2018`) rendered into a `{{year}}` placeholder
//! * Check-only mode with diffs, and modify mode
//! * Injectable [`vcs::Vcs`] and [`clock::Clock`] for deterministic tests
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use headerstamp::clock::SystemClock;
//! use headerstamp::reconcile::{Baseline, get_vcs_changes};
//! use headerstamp::vcs::GitCli;
//!
//! fn main() -> anyhow::Result<()> {
//!     let git = GitCli::new(".");
//!     let changes = get_vcs_changes(&git, &SystemClock, &Baseline::new("origin", "main"), false)?;
//!
//!     for change in &changes {
//!         println!("{}: {}", change.path(), change.years());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`vcs`] - The version-control capability and its git implementation
//! * [`changes`] - Parsers for diff and status output
//! * [`history`] - Creation and last edition years of a file
//! * [`reconcile`] - The deduplicated change set
//! * [`header`] - Header templates and the header writer
//! * [`logging`] - Logging utilities for verbose output

pub mod changes;
pub mod clock;
pub mod config;
pub mod diff;
pub mod header;
pub mod history;
pub mod logging;
pub mod output;
pub mod reconcile;
pub mod report;
pub mod vcs;
pub mod workspace;
