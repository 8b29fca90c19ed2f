//! Version command implementation

use crate::cli::Output;
use crate::{PKG_DESCRIPTION, PKG_NAME, VERSION};
use anyhow::Result;

/// Execute the version command
pub async fn execute(output: &Output) -> Result<()> {
    output.header("Version Information");
    output.key_value("Version:", &format!("{} v{}", PKG_NAME, VERSION), true);
    output.key_value("Description:", PKG_DESCRIPTION, false);

    output.category("Build Information");
    output.key_value("Rust edition:", "2024", false);
    output.key_value("Target:", std::env::consts::ARCH, false);
    output.key_value(
        "Profile:",
        if cfg!(debug_assertions) { "debug" } else { "release" },
        false,
    );

    output.blank_line();
    output.info(&format!("Run '{} --help' for usage information", PKG_NAME));

    Ok(())
}
