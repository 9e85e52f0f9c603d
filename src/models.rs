//! Data structures produced while scanning sources and building the mirror.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Mapping from original absolute URL to the flat local name assigned in the mirror.
///
/// Entries are only ever added. The first name recorded for a URL is authoritative, so seeing the
/// same URL again (from another file or from a stylesheet) never renames an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UrlMapping {
  entries: BTreeMap<String, String>,
}

impl UrlMapping {
  /// Create an empty mapping.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record `url -> name` unless the URL is already mapped.
  ///
  /// Returns `true` when the entry was newly introduced.
  pub fn insert(&mut self, url: impl Into<String>, name: impl Into<String>) -> bool {
    match self.entries.entry(url.into()) {
      Entry::Vacant(slot) => {
        slot.insert(name.into());
        true
      }
      Entry::Occupied(_) => false,
    }
  }

  /// Local name previously assigned to `url`.
  pub fn get(&self, url: &str) -> Option<&str> {
    self.entries.get(url).map(String::as_str)
  }

  /// Whether `url` already has a local name.
  pub fn contains(&self, url: &str) -> bool {
    self.entries.contains_key(url)
  }

  /// Number of mapped URLs.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether nothing has been mapped yet.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate over `(url, name)` pairs in URL order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(url, name)| (url.as_str(), name.as_str()))
  }
}

/// A reference that was rewritten, reported for logging and run summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  /// Absolute URL the reference pointed at.
  pub url: String,
  /// Local name substituted for it.
  pub name: String,
  /// File the reference was found in.
  pub file: PathBuf,
}

/// Outcome of running the stylesheet pass over one mirrored asset.
#[derive(Debug, Default)]
pub struct StylesheetRewrite {
  /// Whether the stylesheet was written back.
  pub changed: bool,
  /// URLs introduced by this stylesheet that still need to be downloaded.
  pub discovered: Vec<(String, String)>,
}

/// Summary of one download sweep performed by [`crate::mirror::MirrorBuilder`].
#[derive(Debug, Default)]
pub struct MirrorReport {
  /// Local names written to the destination directory.
  pub fetched: Vec<String>,
  /// URLs that could not be mirrored together with the reason.
  pub failed: Vec<(String, String)>,
  /// Stylesheets whose nested references were rewritten.
  pub stylesheets_rewritten: Vec<String>,
  /// URLs discovered inside stylesheets during the second pass.
  pub discovered: Vec<(String, String)>,
}

/// Summary of a `process` run returned by [`crate::OfflineMirror::process`].
#[derive(Debug, Default)]
pub struct ProcessReport {
  /// Source files rewritten during the scan.
  pub rewritten_files: Vec<PathBuf>,
  /// Source files skipped because they contained an unexpected reference.
  pub skipped_files: Vec<(PathBuf, String)>,
  /// Every reference substituted in the source tree.
  pub references: Vec<Reference>,
  /// Download summary when a destination directory was provided.
  pub mirror: Option<MirrorReport>,
  /// Mapping accumulated over the run.
  pub mapping: UrlMapping,
}

/// Summary of a `replace` run returned by [`crate::OfflineMirror::replace`].
#[derive(Debug, Default)]
pub struct ReplaceReport {
  /// Source files where the placeholder was substituted.
  pub source_files: Vec<PathBuf>,
  /// Mirrored stylesheets where the placeholder was substituted.
  pub stylesheets: Vec<PathBuf>,
  /// Manifest entries whose local file is absent from the download directory.
  pub missing_assets: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_insertion_wins() {
    let mut mapping = UrlMapping::new();
    assert!(mapping.insert("https://a/x.css", "one.css"));
    assert!(!mapping.insert("https://a/x.css", "two.css"));
    assert_eq!(mapping.get("https://a/x.css"), Some("one.css"));
    assert_eq!(mapping.len(), 1);
  }

  #[test]
  fn serialises_as_a_plain_object() {
    let mut mapping = UrlMapping::new();
    mapping.insert("https://b/y.js", "b.js");
    mapping.insert("https://a/x.css", "a.css");

    let json = serde_json::to_string(&mapping).unwrap();
    assert_eq!(json, r#"{"https://a/x.css":"a.css","https://b/y.js":"b.js"}"#);

    let parsed: UrlMapping = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, mapping);
  }
}
