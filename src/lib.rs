#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod finalize;
pub mod logging;
pub mod manifest;
pub mod mirror;
pub mod models;
pub mod references;
pub mod rewrite;
pub mod scanning;

pub use builder::{BuildResult, OfflineMirror};
pub use config::MirrorConfig;
pub use error::{FetchError, MirrorError};
pub use fetch::{Fetcher, HttpFetcher};
pub use models::UrlMapping;
