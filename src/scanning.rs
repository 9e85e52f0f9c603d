//! Directory scanning utilities for locating the text files that carry references.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MirrorError, MirrorResult};

/// Walk `root` collecting files whose extension is one of `extensions`.
///
/// Hidden files and directories are skipped. The result is sorted so runs visit files in the
/// same order on every platform.
pub fn collect_files_recursively(root: &Path, extensions: &[String]) -> MirrorResult<Vec<PathBuf>> {
  if !root.is_dir() {
    return Err(MirrorError::MissingDirectory {
      path: root.to_path_buf(),
    });
  }

  let mut files = Vec::new();
  collect_into(root, extensions, &mut files)?;
  files.sort();
  Ok(files)
}

fn collect_into(dir: &Path, extensions: &[String], files: &mut Vec<PathBuf>) -> MirrorResult<()> {
  let entries = fs::read_dir(dir).map_err(|err| MirrorError::io(dir, err))?;
  for entry in entries {
    let entry = entry.map_err(|err| MirrorError::io(dir, err))?;
    let file_name = entry.file_name();
    if file_name.to_string_lossy().starts_with('.') {
      continue;
    }

    let path = entry.path();
    let file_type = entry.file_type().map_err(|err| MirrorError::io(&path, err))?;
    if file_type.is_dir() {
      collect_into(&path, extensions, files)?;
    } else if file_type.is_file() && has_extension(&path, extensions) {
      files.push(path);
    }
  }

  Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
  let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
    return false;
  };
  extensions
    .iter()
    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}
