//! # Configuration Module
//!
//! Configuration support for headerstamp: which header to write, which files
//! it applies to, and which remote branch changes are measured against.
//!
//! Configuration can be specified in a `.headerstamp.toml` file or via the
//! `HEADERSTAMP_CONFIG` environment variable.
//!
//! ```toml
//! header-file = "license-header.txt"
//! includes = ["src/**/*.rs", "build.rs"]
//!
//! [baseline]
//! remote = "origin"
//! branch = "main"
//!
//! [changes]
//! exclude-untracked = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::reconcile::Baseline;
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".headerstamp.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "HEADERSTAMP_CONFIG";

/// Remote branch that committed changes are diffed against.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BaselineConfig {
  pub remote: String,
  pub branch: String,
}

impl Default for BaselineConfig {
  fn default() -> Self {
    let baseline = Baseline::default();
    Self {
      remote: baseline.remote,
      branch: baseline.branch,
    }
  }
}

/// Options for change discovery.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ChangesConfig {
  /// Leave out files that git does not track yet.
  pub exclude_untracked: bool,
}

/// Main configuration struct for headerstamp.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
  /// Header template, relative to the workspace root unless absolute.
  pub header_file: Option<PathBuf>,

  /// Glob patterns, relative to the workspace root, of files that carry the
  /// header.
  pub includes: Vec<String>,

  pub baseline: BaselineConfig,

  pub changes: ChangesConfig,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A value is present but unusable.
  #[error("Invalid value for '{key}': {message}")]
  InvalidValue { key: &'static str, message: String },
}

impl Config {
  /// Load configuration from a file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    verbose_log!(
      "Loaded config: baseline {}/{}, {} include patterns",
      config.baseline.remote,
      config.baseline.branch,
      config.includes.len()
    );

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - remote and branch are non-empty and contain no whitespace
  /// - every include is a valid glob pattern
  /// - `header-file`, when given, is not empty
  pub fn validate(&self) -> Result<(), ConfigError> {
    validate_ref_name("baseline.remote", &self.baseline.remote)?;
    validate_ref_name("baseline.branch", &self.baseline.branch)?;

    for pattern in &self.includes {
      glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidValue {
        key: "includes",
        message: format!("'{pattern}' is not a valid glob: {e}"),
      })?;
    }

    if self.header_file.as_ref().is_some_and(|path| path.as_os_str().is_empty()) {
      return Err(ConfigError::InvalidValue {
        key: "header-file",
        message: "path cannot be empty".to_string(),
      });
    }

    Ok(())
  }

  pub fn baseline(&self) -> Baseline {
    Baseline::new(&self.baseline.remote, &self.baseline.branch)
  }

  /// Applies values given on the command line, which win over the file.
  pub fn merge_cli_overrides(&mut self, overrides: CliOverrides) {
    if let Some(remote) = overrides.remote {
      self.baseline.remote = remote;
    }
    if let Some(branch) = overrides.branch {
      self.baseline.branch = branch;
    }
    if let Some(header_file) = overrides.header_file {
      self.header_file = Some(header_file);
    }
    if !overrides.includes.is_empty() {
      self.includes = overrides.includes;
    }
    if overrides.exclude_untracked {
      self.changes.exclude_untracked = true;
    }
  }
}

fn validate_ref_name(key: &'static str, value: &str) -> Result<(), ConfigError> {
  if value.is_empty() {
    return Err(ConfigError::InvalidValue {
      key,
      message: "cannot be empty".to_string(),
    });
  }
  if value.chars().any(char::is_whitespace) {
    return Err(ConfigError::InvalidValue {
      key,
      message: format!("'{value}' contains whitespace"),
    });
  }
  Ok(())
}

/// Configuration values taken from command-line flags.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
  pub remote: Option<String>,
  pub branch: Option<String>,
  pub header_file: Option<PathBuf>,
  pub includes: Vec<String>,
  pub exclude_untracked: bool,
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `HEADERSTAMP_CONFIG` environment variable
/// 3. `.headerstamp.toml` in the workspace root
pub fn discover_config_path(explicit_path: Option<&Path>, workspace_root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let workspace_config = workspace_root.join(DEFAULT_CONFIG_FILENAME);
  if workspace_config.exists() {
    verbose_log!("Using workspace config: {}", workspace_config.display());
    return Some(workspace_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path, or return the defaults.
///
/// An explicit path that does not exist is an error rather than silently
/// falling back to the defaults.
pub fn load_config(explicit_path: Option<&Path>, workspace_root: &Path, no_config: bool) -> Result<Config> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(Config::default());
  }

  if let Some(path) = explicit_path
    && !path.exists()
  {
    anyhow::bail!("Config file {} does not exist", path.display());
  }

  match discover_config_path(explicit_path, workspace_root) {
    Some(path) => Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display())),
    None => Ok(Config::default()),
  }
}
