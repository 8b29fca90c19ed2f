//! Configuration management for filesize-filter
//!
//! The configuration is passed explicitly to whoever needs it. It is loaded
//! once per process through a layered figment chain (see [`core`]) and
//! carries the enabled flag and the minimum file size the cleanup tasks check
//! before running the cleaner.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cleaner::Threshold;

pub mod core;
pub mod overrides;
pub mod smart_load;

pub use self::core::{ENV_PREFIX, REPO_CONFIG_FILE};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Enable the size filter
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Files smaller than this many megabytes are removed
    #[serde(default = "default_min_file_size_mb")]
    pub min_file_size_mb: u32,

    /// Media library settings
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Media library configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory scanned for media files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Location of the JSON catalog index
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Delete files from disk as well as from the catalog
    #[serde(default)]
    pub delete_files: bool,

    /// Glob patterns matched against file names during a library scan
    #[serde(default = "default_media_patterns")]
    pub media_patterns: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_min_file_size_mb() -> u32 {
    100
}

fn default_index_path() -> PathBuf {
    PathBuf::from(".filesize-filter/library.json")
}

fn default_media_patterns() -> Vec<String> {
    [
        "*.mkv", "*.mp4", "*.m4v", "*.avi", "*.mov", "*.wmv", "*.webm", "*.ts", "*.m2ts", "*.mpg",
        "*.mpeg", "*.flv", "*.mp3", "*.flac", "*.m4a", "*.aac", "*.ogg", "*.opus", "*.wav", "*.wma",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            min_file_size_mb: default_min_file_size_mb(),
            library: LibraryConfig::default(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: None,
            index_path: default_index_path(),
            delete_files: false,
            media_patterns: default_media_patterns(),
        }
    }
}

impl FilterConfig {
    /// Minimum size as a byte threshold
    pub fn threshold(&self) -> Threshold {
        Threshold::from_megabytes(self.min_file_size_mb)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.library.index_path.as_os_str().is_empty() {
            anyhow::bail!("library.index_path cannot be empty");
        }

        if self.library.media_patterns.is_empty() {
            anyhow::bail!("At least one media pattern must be specified");
        }

        for pattern in &self.library.media_patterns {
            globset::Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("Invalid media pattern '{}': {}", pattern, e))?;
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
