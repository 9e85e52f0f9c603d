//! Rewrite engine substituting discovered references with placeholder-based mirror URLs.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::asset_paths::{Resolution, name_for, normalize_url, resolve};
use crate::config::MirrorConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::models::{Reference, StylesheetRewrite, UrlMapping};
use crate::references::{ReferenceMatcher, SourceLiteralMatcher, StylesheetMatcher};

/// Outcome of scanning one source file.
#[derive(Debug, Default)]
pub struct SourceRewrite {
  /// Whether the file was written back.
  pub changed: bool,
  /// References substituted in the file, in line order.
  pub references: Vec<Reference>,
}

/// Rewrites source files and mirrored stylesheets one file at a time.
#[derive(Debug, Clone)]
pub struct Rewriter {
  placeholder: String,
  source_matcher: SourceLiteralMatcher,
  stylesheet_matcher: StylesheetMatcher,
}

impl Rewriter {
  /// Create a rewriter inserting `placeholder` as the mirror base.
  pub fn new(placeholder: impl Into<String>, source_matcher: SourceLiteralMatcher) -> Self {
    Self {
      placeholder: placeholder.into(),
      source_matcher,
      stylesheet_matcher: StylesheetMatcher,
    }
  }

  /// Create a rewriter from the run configuration.
  pub fn from_config(config: &MirrorConfig) -> Self {
    Self::new(config.placeholder.clone(), config.source_matcher())
  }

  /// Placeholder base inserted in front of every local name.
  pub fn placeholder(&self) -> &str {
    &self.placeholder
  }

  fn local_url(&self, name: &str) -> String {
    format!("{}/{}", self.placeholder, name)
  }

  /// Rewrite the first `https://` literal of every line in `text`.
  ///
  /// Returns `None` when no line changed. Line terminators are carried through untouched, so
  /// CRLF sources keep their line endings.
  pub fn rewrite_source_text(
    &self,
    text: &str,
    mapping: &UrlMapping,
  ) -> MirrorResult<Option<(String, Vec<(String, String)>)>> {
    let mut assignments = Assignments::new(mapping);
    let mut output = String::with_capacity(text.len());
    let mut changed = false;

    for line in text.split_inclusive('\n') {
      let Some(found) = self.source_matcher.find(line).into_iter().next() else {
        output.push_str(line);
        continue;
      };

      let url = normalize_url(&found.value)?;
      let name = assignments.assign(&url)?;
      debug!(%url, %name, "rewriting source literal");

      output.push_str(&line[..found.span.start]);
      output.push_str(&self.local_url(&name));
      output.push_str(&line[found.span.end..]);
      assignments.record(url, name);
      changed = true;
    }

    Ok(changed.then(|| (output, assignments.into_used())))
  }

  /// Scan a source file for `https://` literals and point them at the placeholder base.
  ///
  /// Files without matches are never written. When a literal is not a valid mirror URL the file is
  /// left untouched and none of its references reach `mapping`.
  pub fn rewrite_source_file(
    &self,
    path: &Path,
    mapping: &mut UrlMapping,
  ) -> MirrorResult<SourceRewrite> {
    let text = fs::read_to_string(path).map_err(|err| MirrorError::io(path, err))?;
    let Some((updated, used)) = self.rewrite_source_text(&text, mapping)? else {
      return Ok(SourceRewrite::default());
    };

    fs::write(path, updated).map_err(|err| MirrorError::io(path, err))?;

    let references = used
      .into_iter()
      .map(|(url, name)| {
        mapping.insert(url.clone(), name.clone());
        Reference {
          url,
          name,
          file: path.to_path_buf(),
        }
      })
      .collect();

    Ok(SourceRewrite {
      changed: true,
      references,
    })
  }

  /// Rewrite every `url()` reference in stylesheet `text`, resolving against `origin_url`.
  ///
  /// Nothing is written and `mapping` is only consulted for names already assigned.
  pub fn rewrite_stylesheet_text(
    &self,
    text: &str,
    origin_url: &str,
    mapping: &UrlMapping,
  ) -> MirrorResult<StagedStylesheet> {
    let mut assignments = Assignments::new(mapping);
    let mut output = text.to_string();
    let mut changed = false;

    for found in self.stylesheet_matcher.find(text) {
      let url = match resolve(origin_url, &found.value)? {
        Resolution::Mirror(url) => url,
        Resolution::Inline => continue,
      };
      let name = assignments.assign(&url)?;
      debug!(reference = %found.value, %url, %name, "rewriting stylesheet reference");

      output.replace_range(found.span, &self.local_url(&name));
      assignments.record(url, name);
      changed = true;
    }

    Ok(StagedStylesheet {
      updated: changed.then_some(output),
      resolved: assignments.into_used(),
    })
  }

  /// Read a mirrored stylesheet downloaded from `origin_url` and rewrite it in memory.
  pub fn stage_stylesheet(
    &self,
    path: &Path,
    origin_url: &str,
    mapping: &UrlMapping,
  ) -> MirrorResult<StagedStylesheet> {
    let text = fs::read_to_string(path).map_err(|err| MirrorError::io(path, err))?;
    self.rewrite_stylesheet_text(&text, origin_url, mapping)
  }

  /// Run the stylesheet pass over a mirrored asset that was downloaded from `origin_url`.
  ///
  /// Newly introduced URLs are inserted into `mapping` and reported in
  /// [`StylesheetRewrite::discovered`] so the caller can download them.
  pub fn rewrite_stylesheet(
    &self,
    path: &Path,
    origin_url: &str,
    mapping: &mut UrlMapping,
  ) -> MirrorResult<StylesheetRewrite> {
    self
      .stage_stylesheet(path, origin_url, mapping)?
      .commit(path, mapping)
  }
}

/// Stylesheet rewritten in memory but not yet written back.
#[derive(Debug, Default)]
pub struct StagedStylesheet {
  /// Rewritten text, `None` when no reference was substituted.
  pub updated: Option<String>,
  /// Every URL a reference resolved to with its local name, whether or not it was already mapped.
  pub resolved: Vec<(String, String)>,
}

impl StagedStylesheet {
  /// Whether `url` is one of the URLs this stylesheet points at.
  pub fn references(&self, url: &str) -> bool {
    self.resolved.iter().any(|(seen, _)| seen == url)
  }

  /// Write the rewritten text to `path` and insert the resolved URLs into `mapping`.
  pub fn commit(self, path: &Path, mapping: &mut UrlMapping) -> MirrorResult<StylesheetRewrite> {
    let Some(updated) = self.updated else {
      return Ok(StylesheetRewrite::default());
    };

    fs::write(path, updated).map_err(|err| MirrorError::io(path, err))?;
    let discovered = self
      .resolved
      .into_iter()
      .filter(|(url, name)| mapping.insert(url.clone(), name.clone()))
      .collect();

    Ok(StylesheetRewrite {
      changed: true,
      discovered,
    })
  }
}

/// Name assignments staged for a single file until it has been written successfully.
struct Assignments<'m> {
  mapping: &'m UrlMapping,
  used: Vec<(String, String)>,
}

impl<'m> Assignments<'m> {
  fn new(mapping: &'m UrlMapping) -> Self {
    Self {
      mapping,
      used: Vec::new(),
    }
  }

  fn assign(&self, url: &str) -> MirrorResult<String> {
    if let Some(name) = self.mapping.get(url) {
      return Ok(name.to_string());
    }
    if let Some((_, name)) = self.used.iter().find(|(seen, _)| seen == url) {
      return Ok(name.clone());
    }
    name_for(url)
  }

  fn record(&mut self, url: String, name: String) {
    if !self.used.iter().any(|(seen, _)| *seen == url) {
      self.used.push((url, name));
    }
  }

  fn into_used(self) -> Vec<(String, String)> {
    self.used
  }
}

#[cfg(test)]
mod tests {
  use std::time::{Duration, SystemTime};

  use super::*;
  use tempfile::tempdir;

  const BASE: &str = "__BASE__";

  fn rewriter() -> Rewriter {
    Rewriter::new(BASE, SourceLiteralMatcher::default())
  }

  #[test]
  fn rewrites_a_literal_and_records_the_mapping() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("map.py");
    fs::write(&path, "href = \"https://cdn.example.com/leaflet.css\"\n")?;

    let mut mapping = UrlMapping::new();
    let outcome = rewriter().rewrite_source_file(&path, &mut mapping)?;
    let name = name_for("https://cdn.example.com/leaflet.css")?;

    assert!(outcome.changed);
    assert_eq!(fs::read_to_string(&path)?, format!("href = \"__BASE__/{name}\"\n"));
    assert_eq!(mapping.get("https://cdn.example.com/leaflet.css"), Some(name.as_str()));
    assert_eq!(outcome.references.len(), 1);
    assert_eq!(outcome.references[0].file, path);
    Ok(())
  }

  #[test]
  fn leaves_files_without_literals_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("plain.py");
    let original = "import os\r\nprint('hello')\r\n";
    fs::write(&path, original)?;
    let past = SystemTime::now() - Duration::from_secs(3600);
    fs::File::options().write(true).open(&path)?.set_modified(past)?;
    let modified = fs::metadata(&path)?.modified()?;

    let mut mapping = UrlMapping::new();
    let outcome = rewriter().rewrite_source_file(&path, &mut mapping)?;

    assert!(!outcome.changed);
    assert!(mapping.is_empty());
    assert_eq!(fs::read(&path)?, original.as_bytes());
    assert_eq!(fs::metadata(&path)?.modified()?, modified);
    Ok(())
  }

  #[test]
  fn preserves_crlf_line_endings() -> Result<(), Box<dyn std::error::Error>> {
    let mapping = UrlMapping::new();
    let text = "a = 'https://x.example.com/a.js'\r\nb = 1\r\n";
    let (updated, used) = rewriter()
      .rewrite_source_text(text, &mapping)?
      .expect("line should be rewritten");
    assert_eq!(used.len(), 1);
    assert!(updated.ends_with("'\r\nb = 1\r\n"));
    assert_eq!(updated.matches("\r\n").count(), 2);
    Ok(())
  }

  #[test]
  fn second_scan_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("assets.py");
    fs::write(
      &path,
      "JS = [\n  ('leaflet', 'https://cdn.example.com/leaflet.js'),\n  ('jquery', \"https://code.example.com/jquery.min.js\"),\n]\n",
    )?;

    let mut mapping = UrlMapping::new();
    let first = rewriter().rewrite_source_file(&path, &mut mapping)?;
    assert!(first.changed);
    assert_eq!(mapping.len(), 2);
    let rewritten = fs::read_to_string(&path)?;

    let second = rewriter().rewrite_source_file(&path, &mut mapping)?;
    assert!(!second.changed);
    assert_eq!(mapping.len(), 2);
    assert_eq!(fs::read_to_string(&path)?, rewritten);
    Ok(())
  }

  #[test]
  fn invalid_literal_aborts_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("bad.py");
    let original = "a = 'https://ok.example.com/a.js'\nb = 'HTTPS://LOUD.EXAMPLE.COM/B.JS'\n";
    fs::write(&path, original)?;

    let mut mapping = UrlMapping::new();
    let err = rewriter().rewrite_source_file(&path, &mut mapping).unwrap_err();

    assert!(matches!(err, MirrorError::InvalidUrlKind { .. }));
    assert!(mapping.is_empty());
    assert_eq!(fs::read_to_string(&path)?, original);
    Ok(())
  }

  #[test]
  fn reuses_existing_names() -> Result<(), Box<dyn std::error::Error>> {
    let mut mapping = UrlMapping::new();
    mapping.insert("https://cdn.example.com/a.js", "pinned.js");
    let (updated, _) = rewriter()
      .rewrite_source_text("x = 'https://cdn.example.com/a.js'\n", &mapping)?
      .expect("line should be rewritten");
    assert_eq!(updated, "x = '__BASE__/pinned.js'\n");
    Ok(())
  }

  #[test]
  fn rewrites_stylesheet_references() -> Result<(), Box<dyn std::error::Error>> {
    let origin = "https://cdn.example.com/a/b/style.css";
    let css = "x{background: url(../img/x.png?v=2)}\ny{background: url(\"data:image/png;base64,AAA\")}\n";
    let mapping = UrlMapping::new();

    let staged = rewriter().rewrite_stylesheet_text(css, origin, &mapping)?;
    let name = name_for("https://cdn.example.com/a/img/x.png")?;

    assert_eq!(
      staged.updated.as_deref().expect("stylesheet should change"),
      format!("x{{background: url(__BASE__/{name})}}\ny{{background: url(\"data:image/png;base64,AAA\")}}\n")
    );
    assert_eq!(staged.resolved, vec![("https://cdn.example.com/a/img/x.png".to_string(), name)]);
    Ok(())
  }

  #[test]
  fn stylesheet_rewrites_keep_quotes_and_reuse_mapped_names() -> Result<(), Box<dyn std::error::Error>> {
    let origin = "https://cdn.example.com/css/all.css";
    let css = "@font-face{src:url('../fonts/a.woff2') format('woff2'),url('../fonts/a.woff2?v=1')}";
    let mut mapping = UrlMapping::new();
    mapping.insert("https://cdn.example.com/fonts/a.woff2", "known.woff2");

    let staged = rewriter().rewrite_stylesheet_text(css, origin, &mapping)?;

    assert_eq!(
      staged.updated.as_deref(),
      Some("@font-face{src:url('__BASE__/known.woff2') format('woff2'),url('__BASE__/known.woff2')}")
    );
    assert!(staged.references("https://cdn.example.com/fonts/a.woff2"));

    let temp = tempdir()?;
    let path = temp.path().join("all.css");
    let outcome = staged.commit(&path, &mut mapping)?;
    assert!(outcome.changed);
    assert!(outcome.discovered.is_empty());
    assert_eq!(mapping.len(), 1);
    Ok(())
  }

  #[test]
  fn stylesheet_without_fetchable_references_is_not_written() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("inline.css");
    fs::write(&path, "a{mask:url(#m)} b{background:url(data:image/gif;base64,R0)}")?;

    let mut mapping = UrlMapping::new();
    let outcome = rewriter().rewrite_stylesheet(&path, "https://cdn.example.com/inline.css", &mut mapping)?;

    assert!(!outcome.changed);
    assert!(outcome.discovered.is_empty());
    assert!(mapping.is_empty());
    Ok(())
  }

  #[test]
  fn stylesheet_file_pass_extends_the_mapping() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("style.css");
    fs::write(&path, ".a{background:url(images/a.png)}.b{background:url(//img.example.com/b.png)}")?;

    let mut mapping = UrlMapping::new();
    let outcome = rewriter().rewrite_stylesheet(&path, "https://cdn.example.com/dist/style.css", &mut mapping)?;

    assert!(outcome.changed);
    assert_eq!(outcome.discovered.len(), 2);
    assert!(mapping.contains("https://cdn.example.com/dist/images/a.png"));
    assert!(mapping.contains("https://img.example.com/b.png"));
    assert!(!fs::read_to_string(&path)?.contains("images/a.png"));
    Ok(())
  }
}
