//! # headerstamp
//!
//! Keeps license headers of changed files up to date.

mod cli;

use anyhow::Result;

use crate::cli::{Cli, Command, run_changes, run_insert};

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse_args();

  match cli.command {
    Some(Command::Insert(args)) => run_insert(args).await,
    Some(Command::Changes(args)) => run_changes(args),
    None => run_insert(cli.insert_args).await,
  }
}
