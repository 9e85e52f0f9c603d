//! Loading and persisting the URL → local-name manifest written next to the mirror.

use std::fs;
use std::path::Path;

use crate::error::{MirrorError, MirrorResult};
use crate::models::UrlMapping;

/// Serialise `mapping` as prettified JSON to `path`.
pub fn write_manifest(path: &Path, mapping: &UrlMapping) -> MirrorResult<()> {
  let mut json = serde_json::to_string_pretty(mapping).map_err(|source| MirrorError::Manifest {
    path: path.to_path_buf(),
    source,
  })?;
  json.push('\n');
  fs::write(path, json).map_err(|err| MirrorError::io(path, err))
}

/// Load a manifest from disk.
pub fn load_manifest(path: &Path) -> MirrorResult<UrlMapping> {
  let content = fs::read_to_string(path).map_err(|err| MirrorError::io(path, err))?;
  serde_json::from_str(&content).map_err(|source| MirrorError::Manifest {
    path: path.to_path_buf(),
    source,
  })
}

/// Load a manifest when it exists, returning an empty mapping otherwise.
pub fn load_manifest_if_present(path: &Path) -> MirrorResult<UrlMapping> {
  if path.is_file() {
    load_manifest(path)
  } else {
    Ok(UrlMapping::new())
  }
}
