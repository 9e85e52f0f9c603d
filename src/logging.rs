//! Structured logging setup for the command-line tool.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` switches the crate's own events to `debug`.
pub fn init_logging(verbose: bool) -> Result<()> {
  let default_directives = if verbose {
    "info,offline_cdn_mirror=debug"
  } else {
    "info"
  };
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init()
    .map_err(|err| anyhow!("failed to initialise logging: {err}"))
}
