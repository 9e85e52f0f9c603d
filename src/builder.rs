//! Mirror run orchestrator driving the scan, download and finalize stages.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::MirrorConfig;
use crate::error::MirrorError;
use crate::fetch::Fetcher;
use crate::finalize::{finalize_files, finalize_tree};
use crate::manifest::{load_manifest_if_present, write_manifest};
use crate::mirror::MirrorBuilder;
use crate::models::{ProcessReport, ReplaceReport, UrlMapping};
use crate::rewrite::Rewriter;
use crate::scanning::collect_files_recursively;

/// Generic build result type used across the orchestration layer.
pub type BuildResult<T> = anyhow::Result<T>;

/// High-level helper running the two phases of an offline mirror.
///
/// `process` rewrites sources against the placeholder base and optionally downloads the assets;
/// `replace` later swaps the placeholder for the real serving base URL.
pub struct OfflineMirror<'a> {
  config: &'a MirrorConfig,
  rewriter: Rewriter,
}

impl<'a> OfflineMirror<'a> {
  /// Create an orchestrator for the provided configuration.
  pub fn new(config: &'a MirrorConfig) -> Self {
    Self {
      config,
      rewriter: Rewriter::from_config(config),
    }
  }

  /// Scan `source_root`, rewrite its `https://` literals and, when `download_dir` is given,
  /// mirror every referenced asset there and write the manifest.
  pub fn process<F: Fetcher>(
    &self,
    source_root: &Path,
    download_dir: Option<&Path>,
    fetcher: &F,
  ) -> BuildResult<ProcessReport> {
    if let Some(dir) = download_dir {
      ensure_directory(dir)?;
    }

    let mut report = ProcessReport {
      mapping: self.seed_mapping(download_dir)?,
      ..ProcessReport::default()
    };

    self.scan_sources(source_root, &mut report)?;

    if let Some(dir) = download_dir {
      let builder = MirrorBuilder::new(fetcher, &self.rewriter, &self.config.stylesheet_extension);
      let mirror = builder.fetch_all(&mut report.mapping, dir)?;
      if !mirror.failed.is_empty() {
        warn!(failed = mirror.failed.len(), "some assets could not be mirrored");
      }

      let manifest_path = dir.join(&self.config.manifest_file);
      write_manifest(&manifest_path, &report.mapping)
        .with_context(|| format!("failed to write manifest {}", manifest_path.display()))?;
      info!(
        path = %manifest_path.display(),
        entries = report.mapping.len(),
        "wrote manifest"
      );
      report.mirror = Some(mirror);
    }

    Ok(report)
  }

  /// Substitute the placeholder with `base_url` across the processed sources and, when
  /// `download_dir` is given, across the mirrored stylesheets.
  pub fn replace(
    &self,
    source_root: &Path,
    base_url: &str,
    download_dir: Option<&Path>,
  ) -> BuildResult<ReplaceReport> {
    ensure_directory(source_root)?;
    if let Some(dir) = download_dir {
      ensure_directory(dir)?;
    }

    let placeholder = self.rewriter.placeholder();
    let mut report = ReplaceReport {
      source_files: finalize_tree(
        source_root,
        &self.config.source_extensions,
        placeholder,
        base_url,
      )?,
      ..ReplaceReport::default()
    };

    if let Some(dir) = download_dir {
      let mapping = self.seed_mapping(Some(dir))?;
      report.missing_assets = mapping
        .iter()
        .filter(|(_, name)| !dir.join(name).is_file())
        .map(|(url, name)| (url.to_string(), name.to_string()))
        .collect();
      for (url, name) in &report.missing_assets {
        warn!(%url, %name, "manifest entry has no mirrored file");
      }

      let stylesheets =
        collect_files_recursively(dir, std::slice::from_ref(&self.config.stylesheet_extension))?;
      report.stylesheets = finalize_files(&stylesheets, placeholder, base_url)?;
    }

    Ok(report)
  }

  fn seed_mapping(&self, download_dir: Option<&Path>) -> BuildResult<UrlMapping> {
    let Some(dir) = download_dir else {
      return Ok(UrlMapping::new());
    };

    let manifest_path = dir.join(&self.config.manifest_file);
    let mapping = load_manifest_if_present(&manifest_path)?;
    if !mapping.is_empty() {
      info!(
        path = %manifest_path.display(),
        entries = mapping.len(),
        "loaded existing manifest"
      );
    }
    Ok(mapping)
  }

  fn scan_sources(&self, source_root: &Path, report: &mut ProcessReport) -> BuildResult<()> {
    let files = collect_files_recursively(source_root, &self.config.source_extensions)?;
    info!(root = %source_root.display(), files = files.len(), "scanning sources");

    for path in files {
      match self.rewriter.rewrite_source_file(&path, &mut report.mapping) {
        Ok(outcome) if outcome.changed => {
          info!(
            path = %path.display(),
            references = outcome.references.len(),
            "rewrote source file"
          );
          report.references.extend(outcome.references);
          report.rewritten_files.push(path);
        }
        Ok(_) => {}
        Err(err) => {
          warn!(path = %path.display(), error = %err, "left source file untouched");
          report.skipped_files.push((path, err.to_string()));
        }
      }
    }

    Ok(())
  }
}

fn ensure_directory(path: &Path) -> Result<(), MirrorError> {
  if path.is_dir() {
    Ok(())
  } else {
    Err(MirrorError::MissingDirectory {
      path: path.to_path_buf(),
    })
  }
}
