//! Run configuration loader describing which files are scanned and how the mirror is laid out.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::references::SourceLiteralMatcher;

/// File looked up in the source root when no explicit configuration is given.
pub const DEFAULT_CONFIG_FILE: &str = "mirror.config.json";

/// Sentinel written in place of the final serving base URL until `replace` runs.
pub const DEFAULT_PLACEHOLDER: &str = "__mystery://placeholder__";

/// Discoverable configuration for a mirror run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
  /// Placeholder base inserted during scanning and substituted by `replace`.
  pub placeholder: String,
  /// Extensions (without the dot) of source files scanned for `https://` literals.
  pub source_extensions: Vec<String>,
  /// Extension (without the dot) identifying mirrored stylesheets.
  pub stylesheet_extension: String,
  /// Trimmed line prefixes marking illustrative text that must not be rewritten.
  pub skip_line_prefixes: Vec<String>,
  /// File name of the URL mapping written to the download directory.
  pub manifest_file: String,
  /// Optional per-request timeout for downloads; unbounded when absent.
  pub request_timeout_secs: Option<u64>,
  /// Optional `User-Agent` header sent with every download.
  pub user_agent: Option<String>,
}

impl Default for MirrorConfig {
  fn default() -> Self {
    Self {
      placeholder: DEFAULT_PLACEHOLDER.into(),
      source_extensions: vec!["py".into()],
      stylesheet_extension: "css".into(),
      skip_line_prefixes: vec![">>>".into(), "...".into()],
      manifest_file: "zzdownloaded.json".into(),
      request_timeout_secs: None,
      user_agent: None,
    }
  }
}

impl MirrorConfig {
  /// Attempt to load configuration from the provided source root.
  ///
  /// When the configuration file does not exist or fails to parse we fall back to default
  /// values so a bare source tree can be processed without any setup.
  pub fn discover(source_root: &Path) -> Self {
    let candidate = source_root.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file, if it exists and parses.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Read configuration from an explicitly requested file, surfacing any failure.
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read configuration {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse configuration {}", path.display()))
  }

  /// Matcher for source-literal scanning honouring the configured skip prefixes.
  pub fn source_matcher(&self) -> SourceLiteralMatcher {
    SourceLiteralMatcher::new(self.skip_line_prefixes.iter().cloned())
  }

  /// Download timeout, if one is configured.
  pub fn request_timeout(&self) -> Option<Duration> {
    self.request_timeout_secs.map(Duration::from_secs)
  }
}
