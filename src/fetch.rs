//! Blocking retrieval of mirrored assets.

use anyhow::{Context, Result};

use crate::config::MirrorConfig;
use crate::error::FetchError;

/// Source of raw asset bytes for the mirror builder.
pub trait Fetcher {
  /// Retrieve the body stored at `url`.
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher issuing one blocking `GET` per asset.
pub struct HttpFetcher {
  client: reqwest::blocking::Client,
}

impl HttpFetcher {
  /// Build an HTTP fetcher honouring the configured timeout and user agent.
  ///
  /// Without a configured timeout requests are unbounded; callers bound the run externally.
  pub fn new(config: &MirrorConfig) -> Result<Self> {
    let mut builder = reqwest::blocking::Client::builder().timeout(config.request_timeout());
    if let Some(agent) = &config.user_agent {
      builder = builder.user_agent(agent.clone());
    }
    let client = builder.build().context("failed to build asset download http client")?;
    Ok(Self { client })
  }
}

impl Fetcher for HttpFetcher {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = self.client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status(status.as_u16()));
    }
    Ok(response.bytes()?.to_vec())
  }
}
