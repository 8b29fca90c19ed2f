use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::Serialize;
use std::path::Path;

use super::FilterConfig;
use super::overrides::strip_unset;
use super::smart_load;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Repository-level config file, looked up in the working directory
pub const REPO_CONFIG_FILE: &str = "filesize-filter.toml";

/// Prefix of environment variable overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "FILESIZE_FILTER_";

impl FilterConfig {
    /// Load configuration from every layer, lowest priority first:
    /// embedded defaults, user config, repository config, `custom_config`,
    /// `FILESIZE_FILTER_*` environment variables and `cli_overrides`.
    pub fn load<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(smart_load::auto(Self::user_config_path()))
            .merge(Toml::file(REPO_CONFIG_FILE));

        if let Some(custom_path) = custom_config {
            if !Path::new(custom_path).exists() {
                anyhow::bail!("Config file not found: {}", custom_path);
            }
            tracing::debug!("Using config file {}", custom_path);
            figment = figment.merge(smart_load::auto(custom_path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(cli) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(strip_unset(cli)));
        }

        let config: FilterConfig = figment
            .extract()
            .context("Failed to load filesize-filter configuration")?;

        tracing::trace!(
            "CONFIG LOAD: enabled = {}, min_file_size_mb = {}",
            config.enabled,
            config.min_file_size_mb
        );

        Ok(config)
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/filesize-filter/config.toml", home),
            Err(_) => "~/.config/filesize-filter/config.toml".to_string(),
        }
    }
}
