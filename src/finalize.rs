//! Second phase of the base-URL indirection: swap the placeholder for the real mirror base.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MirrorError, MirrorResult};
use crate::scanning::collect_files_recursively;

/// Strip trailing slashes so `base/name` never contains `//`.
pub fn trim_base_url(base_url: &str) -> &str {
  base_url.trim_end_matches('/')
}

/// Replace every occurrence of `placeholder` with `base_url` in the given files.
///
/// Only files that contain the placeholder are written. Returns the files that changed.
pub fn finalize_files(
  files: &[PathBuf],
  placeholder: &str,
  base_url: &str,
) -> MirrorResult<Vec<PathBuf>> {
  let base_url = trim_base_url(base_url);
  let mut changed = Vec::new();
  if placeholder.is_empty() {
    return Ok(changed);
  }

  for path in files {
    let text = fs::read_to_string(path).map_err(|err| MirrorError::io(path, err))?;
    let occurrences = text.matches(placeholder).count();
    if occurrences == 0 {
      debug!(path = %path.display(), "no placeholder present");
      continue;
    }

    fs::write(path, text.replace(placeholder, base_url))
      .map_err(|err| MirrorError::io(path, err))?;
    info!(path = %path.display(), occurrences, "substituted mirror base");
    changed.push(path.clone());
  }

  Ok(changed)
}

/// Finalize every file below `root` whose extension is listed in `extensions`.
pub fn finalize_tree(
  root: &Path,
  extensions: &[String],
  placeholder: &str,
  base_url: &str,
) -> MirrorResult<Vec<PathBuf>> {
  let files = collect_files_recursively(root, extensions)?;
  finalize_files(&files, placeholder, base_url)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn substitutes_placeholder_with_trimmed_base() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.py"), "x = '__BASE__/abc.js'\ny = \"__BASE__/def.css\"\n").unwrap();
    fs::write(root.join("b.py"), "print('untouched')\n").unwrap();

    let changed = finalize_tree(root, &["py".to_string()], "__BASE__", "http://localhost:8000//").unwrap();

    assert_eq!(changed, vec![root.join("a.py")]);
    assert_eq!(
      fs::read_to_string(root.join("a.py")).unwrap(),
      "x = 'http://localhost:8000/abc.js'\ny = \"http://localhost:8000/def.css\"\n"
    );
    assert_eq!(fs::read_to_string(root.join("b.py")).unwrap(), "print('untouched')\n");
  }

  #[test]
  fn second_finalize_changes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.css");
    fs::write(&path, "a{background:url(__BASE__/x.png)}").unwrap();
    let files = vec![path.clone()];

    assert_eq!(finalize_files(&files, "__BASE__", "https://mirror.local/cdn").unwrap().len(), 1);
    assert!(finalize_files(&files, "__BASE__", "https://mirror.local/other").unwrap().is_empty());
    assert_eq!(
      fs::read_to_string(&path).unwrap(),
      "a{background:url(https://mirror.local/cdn/x.png)}"
    );
  }

  #[test]
  fn trims_trailing_slashes() {
    assert_eq!(trim_base_url("http://host/cdn///"), "http://host/cdn");
    assert_eq!(trim_base_url("http://host"), "http://host");
  }
}
