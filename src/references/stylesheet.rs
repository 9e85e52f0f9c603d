use std::sync::OnceLock;

use regex::Regex;

use super::{ReferenceMatch, ReferenceMatcher};

fn url_function_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"url\(([^)]+)\)").expect("invalid url() regex"))
}

/// Finds every `url(...)` argument in a stylesheet, last match first.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesheetMatcher;

impl ReferenceMatcher for StylesheetMatcher {
  fn find(&self, text: &str) -> Vec<ReferenceMatch> {
    let mut found: Vec<ReferenceMatch> = url_function_pattern()
      .captures_iter(text)
      .filter_map(|caps| caps.get(1))
      .map(|argument| unquote(argument.as_str(), argument.start()))
      .collect();
    found.reverse();
    found
  }
}

/// Narrow the span of a `url()` argument to the value inside optional whitespace and quotes.
fn unquote(argument: &str, offset: usize) -> ReferenceMatch {
  let leading = argument.len() - argument.trim_start().len();
  let trimmed = argument.trim();
  let mut start = offset + leading;
  let mut value = trimmed;

  if let Some(quote) = trimmed.chars().next().filter(|c| *c == '"' || *c == '\'')
    && trimmed.len() >= 2
    && trimmed.ends_with(quote)
  {
    value = &trimmed[1..trimmed.len() - 1];
    start += 1;
  }

  ReferenceMatch {
    span: start..start + value.len(),
    value: value.to_string(),
  }
}
