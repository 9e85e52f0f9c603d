//! Error taxonomy shared by the rewrite engine, the mirror builder and the manifest.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while scanning, rewriting or mirroring references.
#[derive(Debug, Error)]
pub enum MirrorError {
  /// Text matched the reference pattern but is not an absolute `https://` or protocol-relative URL.
  #[error("expected an https:// or protocol-relative URL, found \"{url}\"")]
  InvalidUrlKind {
    /// Offending reference text.
    url: String,
  },
  /// Download of a single asset failed.
  #[error("failed to fetch {url}: {source}")]
  Fetch {
    /// URL that could not be retrieved.
    url: String,
    /// Underlying transport or storage failure.
    #[source]
    source: FetchError,
  },
  /// A directory the run depends on does not exist.
  #[error("directory {} does not exist", path.display())]
  MissingDirectory {
    /// Directory that was expected.
    path: PathBuf,
  },
  /// Reading or writing a file failed.
  #[error("failed to access {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// The manifest could not be encoded or decoded.
  #[error("failed to process manifest {}: {source}", path.display())]
  Manifest {
    /// Manifest path.
    path: PathBuf,
    /// Source serialization error.
    #[source]
    source: serde_json::Error,
  },
}

impl MirrorError {
  pub(crate) fn invalid_url(url: impl Into<String>) -> Self {
    Self::InvalidUrlKind { url: url.into() }
  }

  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

/// Reasons a single asset retrieval can fail.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The HTTP request could not be completed.
  #[error(transparent)]
  Http(#[from] reqwest::Error),
  /// The server answered with a status that is not a success.
  #[error("server responded with {0}")]
  Status(u16),
  /// Writing the downloaded body to disk failed.
  #[error(transparent)]
  Storage(#[from] std::io::Error),
  /// Stub fetchers report unknown URLs with this variant.
  #[error("no content available for {0}")]
  Unavailable(String),
}

/// Result alias for library operations.
pub type MirrorResult<T> = Result<T, MirrorError>;
