//! Configuration command implementations

use anyhow::Result;

use super::load_config;
use crate::cli::{ConfigCommands, Context};
use crate::config::FilterConfig;

/// Execute config commands
pub async fn execute(cmd: ConfigCommands, ctx: &Context) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(ctx).await,
        ConfigCommands::Validate => validate(ctx).await,
    }
}

async fn show(ctx: &Context) -> Result<()> {
    // Skip validation so a broken config can still be inspected
    let config = FilterConfig::load(ctx.config_path.as_deref(), None::<()>)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

async fn validate(ctx: &Context) -> Result<()> {
    let output = &ctx.output;
    output.header("Validating Configuration");

    match load_config(ctx, serde_json::json!({})) {
        Ok(config) => {
            output.success("Configuration is valid");
            output.key_value("Enabled:", &config.enabled.to_string(), config.enabled);
            output.key_value("Minimum size:", &config.threshold().to_string(), false);
            output.key_value(
                "Index:",
                &config.library.index_path.display().to_string(),
                false,
            );
            output.key_value(
                "Media patterns:",
                &config.library.media_patterns.len().to_string(),
                false,
            );
            Ok(())
        }
        Err(e) => {
            output.error(&format!("Configuration is invalid: {:#}", e));
            Err(e)
        }
    }
}
