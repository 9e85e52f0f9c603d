//! Mirror builder downloading every mapped asset and expanding stylesheets by one level.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{FetchError, MirrorError, MirrorResult};
use crate::fetch::Fetcher;
use crate::models::{MirrorReport, UrlMapping};
use crate::rewrite::Rewriter;

/// Downloads mapped URLs into a flat destination directory.
///
/// A failed download is logged and recorded in the [`MirrorReport`]; the remaining URLs are
/// still fetched so a partial mirror stays usable.
pub struct MirrorBuilder<'a, F: Fetcher> {
  fetcher: &'a F,
  rewriter: &'a Rewriter,
  stylesheet_extension: String,
}

impl<'a, F: Fetcher> MirrorBuilder<'a, F> {
  /// Create a builder fetching through `fetcher` and rewriting stylesheets with `rewriter`.
  pub fn new(fetcher: &'a F, rewriter: &'a Rewriter, stylesheet_extension: &str) -> Self {
    Self {
      fetcher,
      rewriter,
      stylesheet_extension: stylesheet_extension.trim_start_matches('.').to_ascii_lowercase(),
    }
  }

  /// Fetch every entry of `mapping` into `destination`, then run the stylesheet pass.
  ///
  /// URLs discovered inside the fetched stylesheets are added to `mapping` and downloaded before
  /// returning. Stylesheets referenced from another mapped stylesheet count as that second level
  /// and are never scanned, so re-running against a seeded mapping discovers nothing new.
  pub fn fetch_all(
    &self,
    mapping: &mut UrlMapping,
    destination: &Path,
  ) -> MirrorResult<MirrorReport> {
    if !destination.is_dir() {
      return Err(MirrorError::MissingDirectory {
        path: destination.to_path_buf(),
      });
    }

    let mut report = MirrorReport::default();
    let first_level: Vec<(String, String)> = mapping
      .iter()
      .map(|(url, name)| (url.to_string(), name.to_string()))
      .collect();

    for (url, name) in &first_level {
      self.fetch_into(url, name, destination, &mut report);
    }

    let mut staged = Vec::new();
    for (url, name) in &first_level {
      if !self.is_stylesheet(name) || !report.fetched.contains(name) {
        continue;
      }

      match self.rewriter.stage_stylesheet(&destination.join(name), url, mapping) {
        Ok(stylesheet) => staged.push((url, name, stylesheet)),
        Err(err) => {
          warn!(%url, %name, error = %err, "skipping stylesheet pass");
          report.failed.push((url.clone(), err.to_string()));
        }
      }
    }

    // A stylesheet another mapped stylesheet points at is second level, even when a seeded
    // manifest already lists it.
    let nested: Vec<bool> = staged
      .iter()
      .map(|(url, _, _)| {
        staged
          .iter()
          .any(|(other, _, stylesheet)| other != url && stylesheet.references(url))
      })
      .collect();

    let mut discovered = Vec::new();
    for ((url, name, stylesheet), nested) in staged.into_iter().zip(nested) {
      if nested {
        debug!(%url, %name, "leaving nested stylesheet unscanned");
        continue;
      }

      match stylesheet.commit(&destination.join(name), mapping) {
        Ok(outcome) => {
          if outcome.changed {
            info!(%url, %name, nested = outcome.discovered.len(), "rewrote stylesheet references");
            report.stylesheets_rewritten.push(name.clone());
          }
          discovered.extend(outcome.discovered);
        }
        Err(err) => {
          warn!(%url, %name, error = %err, "skipping stylesheet pass");
          report.failed.push((url.clone(), err.to_string()));
        }
      }
    }

    for (url, name) in &discovered {
      self.fetch_into(url, name, destination, &mut report);
    }
    report.discovered = discovered;

    Ok(report)
  }

  fn fetch_into(&self, url: &str, name: &str, destination: &Path, report: &mut MirrorReport) {
    match self.download(url, &destination.join(name)) {
      Ok(size) => {
        info!(%url, %name, bytes = size, "mirrored asset");
        report.fetched.push(name.to_string());
      }
      Err(err) => {
        warn!(%url, %name, error = %err, "failed to mirror asset");
        report.failed.push((url.to_string(), err.to_string()));
      }
    }
  }

  fn download(&self, url: &str, target: &Path) -> MirrorResult<usize> {
    let wrap = |source: FetchError| MirrorError::Fetch {
      url: url.to_string(),
      source,
    };
    let body = self.fetcher.fetch(url).map_err(wrap)?;
    fs::write(target, &body).map_err(|err| wrap(FetchError::Storage(err)))?;
    Ok(body.len())
  }

  fn is_stylesheet(&self, name: &str) -> bool {
    Path::new(name)
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.stylesheet_extension))
  }
}
