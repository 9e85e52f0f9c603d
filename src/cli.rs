//! Command-line surface for the `process` and `replace` phases.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::builder::OfflineMirror;
use crate::config::MirrorConfig;
use crate::fetch::HttpFetcher;

/// Rewrite CDN references to a local mirror and download the mirrored assets.
#[derive(Debug, Parser)]
#[command(name = "offline-cdn-mirror", version)]
#[command(about = "Rewrite https:// references to a local mirror", long_about = None)]
pub struct Cli {
  /// Emit debug-level events for every rewritten reference.
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Phase to run.
  #[command(subcommand)]
  pub command: CliCommand,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct SourceArgs {
  /// Root directory of the source files to rewrite.
  #[arg(long, value_name = "DIR")]
  pub source: PathBuf,

  /// Directory holding the mirrored assets and the manifest.
  #[arg(long, value_name = "DIR")]
  pub download: Option<PathBuf>,

  /// Explicit configuration file; defaults to `mirror.config.json` in the source root.
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,
}

/// Phases of a mirror run.
#[derive(Debug, Subcommand)]
pub enum CliCommand {
  /// Rewrite https:// literals to the placeholder base and optionally download the assets.
  Process {
    /// Source and download locations.
    #[command(flatten)]
    args: SourceArgs,
  },

  /// Substitute the placeholder base with the final serving URL.
  Replace {
    /// Source and download locations.
    #[command(flatten)]
    args: SourceArgs,

    /// Base URL the mirror is served from, e.g. http://localhost:8000.
    #[arg(long, value_name = "URL")]
    url: String,
  },
}

impl Cli {
  /// Execute the parsed command.
  pub fn run(self) -> Result<()> {
    match self.command {
      CliCommand::Process { args } => {
        let config = load_config(&args)?;
        let fetcher = HttpFetcher::new(&config)?;
        let report =
          OfflineMirror::new(&config).process(&args.source, args.download.as_deref(), &fetcher)?;

        info!(
          rewritten = report.rewritten_files.len(),
          skipped = report.skipped_files.len(),
          urls = report.mapping.len(),
          "source scan finished"
        );
        if let Some(mirror) = &report.mirror {
          info!(
            fetched = mirror.fetched.len(),
            failed = mirror.failed.len(),
            nested = mirror.discovered.len(),
            "mirror finished"
          );
          for (url, reason) in &mirror.failed {
            eprintln!("failed: {url}: {reason}");
          }
        }
      }
      CliCommand::Replace { args, url } => {
        let config = load_config(&args)?;
        let report = OfflineMirror::new(&config).replace(&args.source, &url, args.download.as_deref())?;

        info!(
          sources = report.source_files.len(),
          stylesheets = report.stylesheets.len(),
          missing = report.missing_assets.len(),
          "placeholder replaced"
        );
      }
    }

    Ok(())
  }
}

fn load_config(args: &SourceArgs) -> Result<MirrorConfig> {
  match &args.config {
    Some(path) => MirrorConfig::load(path),
    None => Ok(MirrorConfig::discover(&args.source)),
  }
}
