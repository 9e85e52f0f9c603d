use std::sync::OnceLock;

use regex::Regex;

use super::{ReferenceMatch, ReferenceMatcher};

fn https_literal_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)['"](https://[^'"]+)['"]"#).expect("invalid https literal regex")
  })
}

/// Finds the first quoted `https://` literal on a single line of source text.
///
/// Lines that start with one of the skip prefixes (interactive-session prompts in documentation)
/// are illustrative text rather than code and never match.
#[derive(Debug, Clone)]
pub struct SourceLiteralMatcher {
  skip_prefixes: Vec<String>,
}

impl SourceLiteralMatcher {
  /// Create a matcher ignoring lines that begin with any of `skip_prefixes`.
  pub fn new<I, S>(skip_prefixes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      skip_prefixes: skip_prefixes.into_iter().map(Into::into).collect(),
    }
  }

  fn is_skipped(&self, line: &str) -> bool {
    let trimmed = line.trim_start();
    self
      .skip_prefixes
      .iter()
      .any(|prefix| !prefix.is_empty() && trimmed.starts_with(prefix.as_str()))
  }
}

impl Default for SourceLiteralMatcher {
  fn default() -> Self {
    Self::new([">>>", "..."])
  }
}

impl ReferenceMatcher for SourceLiteralMatcher {
  fn find(&self, line: &str) -> Vec<ReferenceMatch> {
    if self.is_skipped(line) {
      return Vec::new();
    }

    https_literal_pattern()
      .captures(line)
      .and_then(|caps| caps.get(1))
      .map(|url| ReferenceMatch {
        span: url.range(),
        value: url.as_str().to_string(),
      })
      .into_iter()
      .collect()
  }
}
