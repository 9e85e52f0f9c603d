use sha1::{Digest, Sha1};

use crate::error::{MirrorError, MirrorResult};

const HTTPS_SCHEME: &str = "https://";

/// Normalise a reference into the absolute `https://` form used as the mapping key.
///
/// Protocol-relative references (`//host/path`) gain the `https:` scheme. Anything that is not
/// already an absolute `https://` URL is rejected, since the matchers should never produce it.
pub fn normalize_url(url: &str) -> MirrorResult<String> {
  if url.starts_with("//") {
    return Ok(format!("https:{url}"));
  }

  if url.starts_with(HTTPS_SCHEME) {
    Ok(url.to_string())
  } else {
    Err(MirrorError::invalid_url(url))
  }
}

/// Derive the flat local file name for a mirrored URL.
///
/// The name is the lowercase SHA-1 of the normalised URL followed by the extension of its final
/// path segment, so identical URLs always share a file and no directory tree is ever produced.
pub fn name_for(url: &str) -> MirrorResult<String> {
  let url = normalize_url(url)?;
  let digest = hex::encode(Sha1::digest(url.as_bytes()));
  Ok(format!("{digest}{}", extension_of(&url)))
}

/// Dotted suffix of the URL's last path segment, or an empty string.
pub fn extension_of(url: &str) -> &str {
  let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
  let Some((_, path)) = without_scheme.split_once('/') else {
    return "";
  };
  let path = path.split(['?', '#']).next().unwrap_or_default();
  let segment = path.rsplit('/').next().unwrap_or_default();

  match segment.rfind('.') {
    Some(index) if index > 0 => {
      let suffix = &segment[index..];
      if suffix.len() > 1 && suffix[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
        suffix
      } else {
        ""
      }
    }
    _ => "",
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::*;

  #[test]
  fn names_are_deterministic() {
    let url = "https://cdn.example.com/leaflet.css";
    assert_eq!(name_for(url).unwrap(), name_for(url).unwrap());
  }

  #[test]
  fn names_are_sha1_hex_with_extension() {
    let name = name_for("https://cdn.example.com/leaflet.css").unwrap();
    let (digest, extension) = name.split_at(40);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(extension, ".css");
  }

  #[test]
  fn known_digest_matches_sha1_of_url() {
    let name = name_for("https://example.com/").unwrap();
    let expected = hex::encode(Sha1::digest(b"https://example.com/"));
    assert_eq!(name, expected);
  }

  #[test]
  fn protocol_relative_references_share_the_https_name() {
    assert_eq!(
      name_for("//cdn.example.com/a/b.js").unwrap(),
      name_for("https://cdn.example.com/a/b.js").unwrap()
    );
  }

  #[test]
  fn rejects_other_schemes() {
    let err = name_for("http://cdn.example.com/a.js").unwrap_err();
    assert!(matches!(err, MirrorError::InvalidUrlKind { .. }));
    assert!(name_for("HTTPS://cdn.example.com/a.js").is_err());
    assert!(name_for("images/a.png").is_err());
  }

  #[test]
  fn names_never_contain_directories() {
    let name = name_for("https://cdn.example.com/deep/nested/path/to/file.min.js").unwrap();
    assert!(!name.contains('/'));
    assert!(name.ends_with(".js"));
  }

  #[test]
  fn extension_ignores_queries_and_odd_suffixes() {
    assert_eq!(extension_of("https://host/x.js?v=1.2"), ".js");
    assert_eq!(extension_of("https://host/font.svg#icons"), ".svg");
    assert_eq!(extension_of("https://fonts.googleapis.com/css?family=Roboto"), "");
    assert_eq!(extension_of("https://host/dir/"), "");
    assert_eq!(extension_of("https://host"), "");
    assert_eq!(extension_of("https://host/.hidden"), "");
    assert_eq!(extension_of("https://host/pkg@1.2.3/dist"), "");
    assert_eq!(extension_of("https://host/archive.tar.gz"), ".gz");
  }

  #[test]
  fn distinct_urls_produce_distinct_names() {
    let names: BTreeSet<String> = (0..2000)
      .map(|index| name_for(&format!("https://cdn.example.com/lib/{index}/asset.js")).unwrap())
      .collect();
    assert_eq!(names.len(), 2000);
  }
}
