use regex::Regex;

fn inline_reference_patterns() -> &'static [Regex] {
  use std::sync::OnceLock;

  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
        Regex::new(r"^#").expect("invalid fragment regex"),
        Regex::new(r"^%").expect("invalid template regex"),
      ]
    })
    .as_slice()
}

/// Determine whether a stylesheet reference denotes inline or non-fetchable content.
///
/// Data URIs, bare fragments (SVG filter references) and `%`-prefixed template placeholders
/// never point at a downloadable resource, so they are left exactly as written.
pub fn is_inline_reference(value: &str) -> bool {
  value.is_empty()
    || inline_reference_patterns()
      .iter()
      .any(|pattern| pattern.is_match(value))
}
