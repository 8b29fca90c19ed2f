//! # filesize-filter - Size-based cleanup for media library catalogs
//!
//! Removes catalog entries whose media files are smaller than a configured
//! minimum size. Typical targets are samples, trailers and truncated
//! downloads that were picked up by a library scan.
//!
//! ## Layout
//!
//! - [`cleaner`]: the two-phase size threshold cleaner (classify, then remove)
//! - [`config`]: layered configuration (defaults, files, env, CLI)
//! - [`library`]: the JSON catalog and the media walker that fills it
//! - [`tasks`]: post-scan and manual cleanup tasks wrapping the cleaner
//! - [`cli`]: the `filesize-filter` command line
//!
//! ## Quick Start
//!
//! ```bash
//! # Catalog a media directory and drop anything under 100 MB
//! filesize-filter scan /srv/media
//!
//! # Preview a stricter threshold
//! filesize-filter clean --min-size 500 --dry-run
//! ```

pub mod cleaner;
pub mod cli;
pub mod config;
pub mod library;
pub mod tasks;

pub use cli::{Cli, Output};
pub use config::FilterConfig;

/// Result type alias for filesize-filter operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
