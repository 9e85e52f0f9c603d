use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use super::filters::is_inline_reference;
use super::naming::normalize_url;
use crate::error::{MirrorError, MirrorResult};

/// Outcome of resolving a reference found inside a mirrored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// Absolute `https://` URL that should be downloaded into the mirror.
  Mirror(String),
  /// Inline or non-fetchable content that must be left untouched.
  Inline,
}

fn scheme_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("invalid scheme regex"))
}

/// Drop a trailing `?query` (cache-busting suffixes) and any `#fragment`.
pub fn strip_query(reference: &str) -> &str {
  reference.split(['?', '#']).next().unwrap_or_default()
}

/// Resolve `reference` against the absolute URL of the document that contains it.
///
/// Relative references are joined onto the base, so dot segments anywhere in the path collapse
/// and extra `../` segments stop at the host root.
pub fn resolve(base_url: &str, reference: &str) -> MirrorResult<Resolution> {
  let reference = reference.trim();
  if is_inline_reference(reference) {
    return Ok(Resolution::Inline);
  }

  let reference = strip_query(reference);
  if reference.is_empty() {
    return Ok(Resolution::Inline);
  }

  if reference.starts_with("//") {
    return Ok(Resolution::Mirror(format!("https:{reference}")));
  }
  if reference.starts_with("https://") {
    return Ok(Resolution::Mirror(reference.to_string()));
  }
  if scheme_pattern().is_match(reference) {
    return Err(MirrorError::invalid_url(reference));
  }

  let base = normalize_url(strip_query(base_url.trim()))?;
  let base = match Url::parse(&base) {
    Ok(url) if url.scheme() == "https" => url,
    _ => return Err(MirrorError::invalid_url(base)),
  };
  let joined = base
    .join(reference)
    .map_err(|_| MirrorError::invalid_url(reference))?;

  Ok(Resolution::Mirror(joined.to_string()))
}
